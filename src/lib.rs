//! Schema-driven exchange of spreadsheet tables with CSV files and ZIP bundles.

pub mod batch;
pub mod codec;
pub mod error;
pub mod reconcile;
pub mod schema;
pub mod storage;
pub mod table;

pub use batch::{BatchResult, CsvPayload, ImportSummary};
pub use error::{BundleError, Result};
pub use schema::{ColumnDef, SchemaRegistry, SchemaResolver, TableSchema, TableType};
pub use table::{Cell, Row, Table};
