// src/batch/mod.rs
//! Multi-table export into a ZIP of CSV files, and the matching import.

pub mod container;
pub mod export;
pub mod import;

pub use export::{export_bundle, export_selected, export_table};
pub use import::{import_selected, import_table, list_payload_names};

use serde::Serialize;

/// One table rendered as CSV text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvPayload {
    pub table_name: String,
    pub csv: String,
}

impl CsvPayload {
    /// Container entry name, `<table>.csv`.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.table_name, container::CSV_EXTENSION)
    }
}

/// Outcome of a multi-table import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub success_count: usize,
    pub total_count: usize,
    pub errors: Vec<String>,
}

impl BatchResult {
    pub fn new(total_count: usize) -> Self {
        Self {
            total_count,
            ..Self::default()
        }
    }

    pub fn record_success(&mut self) {
        self.success_count += 1;
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn is_complete(&self) -> bool {
        self.success_count == self.total_count && self.errors.is_empty()
    }

    /// Human-readable tally plus any per-table errors.
    pub fn summary(&self) -> String {
        let mut msg = format!(
            "Successfully imported {} of {} tables",
            self.success_count, self.total_count
        );
        if !self.errors.is_empty() {
            msg.push_str("\nErrors: ");
            msg.push_str(&self.errors.join("; "));
        }
        msg
    }
}

/// Result of importing a single table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub table_name: String,
    /// Data rows written, header excluded.
    pub rows_imported: usize,
    pub columns_imported: usize,
}
