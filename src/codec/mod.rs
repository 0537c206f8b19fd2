pub mod date;
pub mod decode;
pub mod encode;

pub use date::{parse_date, to_iso_instant};
pub use decode::decode;
pub use encode::{encode, escape_field, render_cell};
