//! Error type shared by the codec, reconciler, storage and batch layers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BundleError {
    // =========================================================================
    // === Structural failures (the requested operation cannot proceed)
    // =========================================================================
    #[error("CSV data is empty")]
    EmptyInput,

    #[error("Missing required columns: {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    #[error("Failed to process ZIP file: {0}")]
    InvalidContainer(String),

    #[error("No data tables found to export")]
    NoData,

    #[error("Table \"{0}\" not found in table definitions")]
    UnknownTable(String),

    #[error("Table \"{0}\" not found in storage")]
    TableNotFound(String),

    // =========================================================================
    // === Schema configuration errors
    // =========================================================================
    #[error("Column \"{column}\" is declared more than once in table \"{table}\"")]
    DuplicateColumn { table: String, column: String },

    #[error("Table \"{0}\" is registered more than once")]
    DuplicateTable(String),

    // =========================================================================
    // === External error wrappers
    // =========================================================================
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, BundleError>;
