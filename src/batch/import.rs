use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{info, instrument, warn};

use super::container::{self, CSV_EXTENSION};
use super::{BatchResult, ImportSummary};
use crate::codec::decode;
use crate::error::{BundleError, Result};
use crate::reconcile::reconcile;
use crate::schema::SchemaResolver;
use crate::storage::TableSink;
use crate::table::Table;

/// Table names of every `.csv` entry in a container, in archive order.
pub fn list_payload_names(bytes: &[u8]) -> Result<Vec<String>> {
    let names = container::unpack(bytes)?
        .into_iter()
        .filter_map(|e| e.name.strip_suffix(CSV_EXTENSION).map(str::to_string))
        .collect();
    Ok(names)
}

/// Decode and reconcile one CSV payload against the table's schema.
fn prepare_table<S>(resolver: &S, table_name: &str, csv_text: &str) -> Result<Table>
where
    S: SchemaResolver + ?Sized,
{
    let schema = resolver
        .get_by_name(table_name)
        .ok_or_else(|| BundleError::UnknownTable(table_name.to_string()))?;
    reconcile(schema, &decode(csv_text))
}

/// Import the `selected` tables from a ZIP container.
///
/// Each table succeeds or fails on its own; failures are collected into the
/// returned `BatchResult`. Only an unreadable container fails the call.
#[instrument(level = "info", skip_all, fields(requested = selected.len()))]
pub fn import_selected<S, W, N>(
    bytes: &[u8],
    selected: &[N],
    resolver: &S,
    writer: &mut W,
) -> Result<BatchResult>
where
    S: SchemaResolver + ?Sized,
    W: TableSink + ?Sized,
    N: AsRef<str> + Sync,
{
    let entries = container::unpack(bytes)?;
    let files: HashMap<&str, &[u8]> = entries
        .iter()
        .map(|e| (e.name.as_str(), e.data.as_slice()))
        .collect();

    // decode + reconcile have no cross-table state; writes stay sequential
    let prepared: Vec<Option<Result<Table>>> = selected
        .par_iter()
        .map(|name| {
            let name: &str = name.as_ref();
            let data = files.get(format!("{}{}", name, CSV_EXTENSION).as_str())?;
            Some(prepare_table(resolver, name, &String::from_utf8_lossy(data)))
        })
        .collect();

    let mut result = BatchResult::new(selected.len());
    for (name, outcome) in selected.iter().zip(prepared) {
        let name: &str = name.as_ref();
        let written = match outcome {
            None => {
                let msg = format!("File not found: {}{}", name, CSV_EXTENSION);
                warn!("{}", msg);
                result.record_error(msg);
                continue;
            }
            Some(prepared) => prepared.and_then(|table| {
                let rows = table.len().saturating_sub(1);
                writer.write_table(name, table).map(|()| rows)
            }),
        };

        match written {
            Ok(rows) => {
                info!(table = name, rows, "imported");
                result.record_success();
            }
            Err(err) => {
                let msg = format!("Failed to import \"{}\": {}", name, err);
                warn!("{}", msg);
                result.record_error(msg);
            }
        }
    }

    info!(
        succeeded = result.success_count,
        total = result.total_count,
        "batch import finished"
    );
    Ok(result)
}

/// Import one table from CSV text.
pub fn import_table<S, W>(
    resolver: &S,
    writer: &mut W,
    table_name: &str,
    csv_text: &str,
) -> Result<ImportSummary>
where
    S: SchemaResolver + ?Sized,
    W: TableSink + ?Sized,
{
    let table = prepare_table(resolver, table_name, csv_text)?;
    let summary = ImportSummary {
        table_name: table_name.to_string(),
        rows_imported: table.len().saturating_sub(1),
        columns_imported: table.column_count(),
    };
    writer.write_table(table_name, table)?;
    info!(
        table = table_name,
        rows = summary.rows_imported,
        "imported"
    );
    Ok(summary)
}
