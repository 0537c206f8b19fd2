// src/reconcile/mod.rs
//! Map parsed CSV rows onto a table's declared shape.
//!
//! Output columns always follow the schema's order, whatever order the
//! uploaded CSV used. Extra input columns are ignored; missing declared
//! columns fail the whole import.

use tracing::{debug, warn};

use crate::codec::parse_date;
use crate::error::{BundleError, Result};
use crate::schema::TableSchema;
use crate::table::{Cell, Row, Table};

/// Where one declared column is read from and written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub column_name: String,
    pub source_index: usize,
    pub dest_index: usize,
    pub is_date: bool,
}

/// Pair every schema column with its index in `header`.
/// Fails with `SchemaMismatch` listing every declared column the header lacks.
pub fn build_column_mapping(schema: &TableSchema, header: &[String]) -> Result<Vec<ColumnMapping>> {
    let mut missing = Vec::new();
    let mut mapping = Vec::with_capacity(schema.column_count());

    for (dest_index, col) in schema.columns().iter().enumerate() {
        match header.iter().position(|h| *h == col.name) {
            Some(source_index) => mapping.push(ColumnMapping {
                column_name: col.name.clone(),
                source_index,
                dest_index,
                is_date: col.date,
            }),
            None => missing.push(col.name.clone()),
        }
    }

    if !missing.is_empty() {
        return Err(BundleError::SchemaMismatch { missing });
    }
    Ok(mapping)
}

/// Convert one source value for its destination column.
pub fn coerce_value(value: &str, mapping: &ColumnMapping) -> Cell {
    if value.is_empty() {
        return Cell::Empty;
    }
    if !mapping.is_date {
        return Cell::Text(value.to_string());
    }
    match parse_date(value) {
        Some(d) => Cell::Date(d),
        None => {
            warn!(
                column = %mapping.column_name,
                value,
                "date conversion failed, keeping original text"
            );
            Cell::Text(value.to_string())
        }
    }
}

/// Reshape parsed rows into the schema's column set and order.
pub fn reconcile(schema: &TableSchema, parsed_rows: &[Vec<String>]) -> Result<Table> {
    let Some((header, data)) = parsed_rows.split_first() else {
        return Err(BundleError::EmptyInput);
    };

    let mapping = build_column_mapping(schema, header)?;
    let width = schema.column_count();

    let mut rows: Vec<Row> = Vec::with_capacity(parsed_rows.len());
    rows.push(schema.column_names().map(Cell::from).collect());

    for source in data {
        let mut row = vec![Cell::Empty; width];
        for m in &mapping {
            let value = source.get(m.source_index).map(String::as_str).unwrap_or("");
            row[m.dest_index] = coerce_value(value, m);
        }
        rows.push(row);
    }

    debug!(
        table = schema.name(),
        rows = rows.len() - 1,
        columns = width,
        "reconciled import"
    );
    Ok(Table::new(rows))
}
