use std::collections::BTreeMap;
use tracing::debug;

use super::{plan_resize, ResizePlan, TableSink, TableSource};
use crate::error::Result;
use crate::table::{Cell, Row, Table};

/// A sheet: allocated rows, possibly with blank trailing rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    grid: Vec<Row>,
}

impl Sheet {
    pub fn from_grid(grid: Vec<Row>) -> Self {
        Self { grid }
    }

    pub fn max_rows(&self) -> usize {
        self.grid.len()
    }

    fn last_column(&self) -> usize {
        self.grid.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Rows up to the last non-blank one, padded to the widest row.
    pub fn data_range(&self) -> Table {
        let last = self
            .grid
            .iter()
            .rposition(|r| !r.iter().all(Cell::is_blank))
            .map_or(0, |i| i + 1);
        let width = self.grid[..last].iter().map(Vec::len).max().unwrap_or(0);
        let rows = self.grid[..last]
            .iter()
            .map(|r| {
                let mut r = r.clone();
                r.resize(width, Cell::Empty);
                r
            })
            .collect();
        Table::new(rows)
    }

    fn apply(&mut self, plan: ResizePlan) {
        match plan {
            ResizePlan::Keep => {}
            ResizePlan::Insert(n) => {
                let width = self.last_column();
                self.grid
                    .extend(std::iter::repeat_with(|| vec![Cell::Empty; width]).take(n));
            }
            ResizePlan::Delete { from, count } => {
                self.grid.drain(from..from + count);
            }
        }
    }

    /// Resize to fit `table`, clear the sheet and write it from the top.
    pub fn overwrite(&mut self, table: Table) {
        let plan = plan_resize(self.max_rows(), table.len());
        self.apply(plan);

        let width = self.last_column();
        for row in self.grid.iter_mut() {
            row.clear();
            row.resize(width, Cell::Empty);
        }
        for (slot, mut row) in self.grid.iter_mut().zip(table.rows) {
            if row.len() < slot.len() {
                row.resize(slot.len(), Cell::Empty);
            }
            *slot = row;
        }
    }
}

/// In-memory sheet store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    sheets: BTreeMap<String, Sheet>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_sheet(&mut self, name: impl Into<String>, sheet: Sheet) {
        self.sheets.insert(name.into(), sheet);
    }

    pub fn with_table(mut self, name: impl Into<String>, table: Table) -> Self {
        self.insert_sheet(name, Sheet::from_grid(table.rows));
        self
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.get(name)
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }
}

impl TableSource for MemoryStore {
    fn read_table(&self, name: &str) -> Result<Option<Table>> {
        Ok(self.sheets.get(name).map(Sheet::data_range))
    }
}

impl TableSink for MemoryStore {
    fn write_table(&mut self, name: &str, table: Table) -> Result<()> {
        let rows = table.len();
        let sheet = self.sheets.entry(name.to_string()).or_insert_with(|| {
            debug!(sheet = name, "creating sheet");
            Sheet::default()
        });
        sheet.overwrite(table);
        debug!(sheet = name, rows, max_rows = sheet.max_rows(), "wrote sheet");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Row> {
        rows.iter()
            .map(|r| r.iter().map(|s| Cell::from(*s)).collect())
            .collect()
    }

    #[test]
    fn data_range_skips_trailing_blank_rows() {
        let sheet = Sheet::from_grid(grid(&[&["a", "b"], &["1"], &["", ""], &[""]]));
        let t = sheet.data_range();
        assert_eq!(t, Table::from_strings(vec![vec!["a", "b"], vec!["1", ""]]));
    }

    #[test]
    fn write_shrinks_stale_rows() -> anyhow::Result<()> {
        let mut store = MemoryStore::new().with_table(
            "t",
            Table::from_strings(vec![vec!["a"], vec!["1"], vec!["2"], vec!["3"], vec!["4"]]),
        );
        store.write_table("t", Table::from_strings(vec![vec!["a"], vec!["9"]]))?;
        assert_eq!(store.sheet("t").unwrap().max_rows(), 2);
        assert_eq!(
            store.read_table("t")?,
            Some(Table::from_strings(vec![vec!["a"], vec!["9"]]))
        );
        Ok(())
    }

    #[test]
    fn write_keeps_two_rows_minimum() -> anyhow::Result<()> {
        let mut store = MemoryStore::new()
            .with_table("t", Table::from_strings(vec![vec!["a"], vec!["1"], vec!["2"]]));
        store.write_table("t", Table::from_strings(vec![vec!["a"]]))?;
        assert_eq!(store.sheet("t").unwrap().max_rows(), 2);
        assert_eq!(
            store.read_table("t")?,
            Some(Table::from_strings(vec![vec!["a"]]))
        );
        Ok(())
    }

    #[test]
    fn write_creates_and_grows() -> anyhow::Result<()> {
        let mut store = MemoryStore::new();
        assert_eq!(store.read_table("new")?, None);
        let t = Table::from_strings(vec![vec!["x", "y"], vec!["1", "2"], vec!["3", "4"]]);
        store.write_table("new", t.clone())?;
        assert_eq!(store.sheet("new").unwrap().max_rows(), 3);
        assert_eq!(store.sheet_names().collect::<Vec<_>>(), vec!["new"]);
        assert_eq!(store.read_table("new")?, Some(t));
        Ok(())
    }

    #[test]
    fn write_clears_wider_old_content() -> anyhow::Result<()> {
        let mut store = MemoryStore::new().with_table(
            "t",
            Table::from_strings(vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]),
        );
        store.write_table("t", Table::from_strings(vec![vec!["a"], vec!["9"]]))?;
        assert_eq!(
            store.read_table("t")?,
            Some(Table::from_strings(vec![
                vec!["a", "", ""],
                vec!["9", "", ""]
            ]))
        );
        Ok(())
    }
}
