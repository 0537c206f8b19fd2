//! Table storage backends.

pub mod dir;
pub mod memory;

pub use dir::DirStore;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::table::Table;

/// Read side of a table store.
pub trait TableSource {
    /// `None` when the store has no table by that name.
    fn read_table(&self, name: &str) -> Result<Option<Table>>;
}

/// Write side of a table store. Creates the table when absent and leaves it
/// holding exactly the rows written.
pub trait TableSink {
    fn write_table(&mut self, name: &str, table: Table) -> Result<()>;
}

/// How a sheet's allocated rows change before a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePlan {
    Keep,
    /// Append this many rows after the current last row.
    Insert(usize),
    /// Delete `count` rows starting at zero-based row `from`.
    Delete { from: usize, count: usize },
}

/// Minimum number of rows a sheet keeps after shrinking.
pub const MIN_SHEET_ROWS: usize = 2;

pub fn plan_resize(current_rows: usize, rows_needed: usize) -> ResizePlan {
    if rows_needed > current_rows {
        return ResizePlan::Insert(rows_needed - current_rows);
    }
    let keep = rows_needed.max(MIN_SHEET_ROWS);
    if current_rows > keep {
        ResizePlan::Delete {
            from: keep,
            count: current_rows - keep,
        }
    } else {
        ResizePlan::Keep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_when_short() {
        assert_eq!(plan_resize(3, 10), ResizePlan::Insert(7));
        assert_eq!(plan_resize(0, 1), ResizePlan::Insert(1));
    }

    #[test]
    fn shrinks_but_keeps_two_rows() {
        assert_eq!(plan_resize(10, 4), ResizePlan::Delete { from: 4, count: 6 });
        assert_eq!(plan_resize(10, 1), ResizePlan::Delete { from: 2, count: 8 });
        assert_eq!(plan_resize(2, 1), ResizePlan::Keep);
        assert_eq!(plan_resize(5, 5), ResizePlan::Keep);
    }
}
