pub mod store;
pub mod types;

pub use store::{SchemaRegistry, SchemaResolver};
pub use types::{ColumnDef, SchemaFile, TableSchema, TableType};
