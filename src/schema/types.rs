// src/schema/types.rs

use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt, str::FromStr};

use crate::error::{BundleError, Result};

/// Category used to pick tables for a batch export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableType {
    Metadata,
    ConfigurationData,
    MasterData,
    TransactionData,
    Log,
}

impl TableType {
    pub const ALL: [TableType; 5] = [
        TableType::Metadata,
        TableType::ConfigurationData,
        TableType::MasterData,
        TableType::TransactionData,
        TableType::Log,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableType::Metadata => "METADATA",
            TableType::ConfigurationData => "CONFIGURATION_DATA",
            TableType::MasterData => "MASTER_DATA",
            TableType::TransactionData => "TRANSACTION_DATA",
            TableType::Log => "LOG",
        }
    }

    /// Types preselected for a data export: everything except metadata and logs.
    pub fn default_export_set() -> HashSet<TableType> {
        [
            TableType::ConfigurationData,
            TableType::MasterData,
            TableType::TransactionData,
        ]
        .into_iter()
        .collect()
    }
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase().replace('-', "_");
        TableType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| format!("unknown table type `{}`", s))
    }
}

/// A single declared column.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq, Hash)]
pub struct ColumnDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub date: bool,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, date: bool) -> Self {
        Self {
            name: name.into(),
            date,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }
}

/// Declared shape of one table. Column names are unique; their order is the
/// canonical output order.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    name: String,
    table_type: TableType,
    columns: Vec<ColumnDef>,
}

impl TableSchema {
    pub fn new(
        name: impl Into<String>,
        table_type: TableType,
        columns: Vec<ColumnDef>,
    ) -> Result<Self> {
        let name = name.into();
        let mut seen = HashSet::with_capacity(columns.len());
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(BundleError::DuplicateColumn {
                    table: name,
                    column: col.name.clone(),
                });
            }
        }
        Ok(Self {
            name,
            table_type,
            columns,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_type(&self) -> TableType {
        self.table_type
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_date_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.date && c.name == name)
    }
}

/// On-disk form of a schema file. The table name comes from the file name.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SchemaFile {
    #[serde(rename = "type")]
    pub table_type: TableType,
    pub columns: Vec<ColumnDef>,
}
