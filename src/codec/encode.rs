use tracing::trace;

use super::date::{parse_date, to_iso_instant};
use crate::schema::TableSchema;
use crate::table::{Cell, Table};

const ROW_TERMINATOR: &str = "\r\n";

/// Render one cell as unescaped CSV text.
///
/// Date cells become ISO-8601 instants. Text in a date column is re-parsed and
/// normalized when it reads as a date, otherwise kept as written.
pub fn render_cell(cell: &Cell, is_date_column: bool) -> String {
    match cell {
        Cell::Date(d) => to_iso_instant(d),
        Cell::Text(s) if is_date_column => match parse_date(s) {
            Some(d) => to_iso_instant(&d),
            None => {
                trace!(value = %s, "date column text kept as-is");
                s.clone()
            }
        },
        other => other.to_plain_string(),
    }
}

/// Quote a field when it carries a comma, a double quote or a line break.
pub fn escape_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Output columns as `(source index, column name)`.
fn output_columns(header: &[String], schema: Option<&TableSchema>) -> Vec<(usize, String)> {
    match schema {
        Some(schema) => schema
            .column_names()
            .filter_map(|name| {
                header
                    .iter()
                    .position(|h| h == name)
                    .map(|idx| (idx, name.to_string()))
            })
            .collect(),
        None => header.iter().cloned().enumerate().collect(),
    }
}

/// Encode a table as CRLF-separated CSV text.
///
/// With a schema, only declared columns that exist in the header are written,
/// in declared order. Data rows whose every cell is blank are dropped.
pub fn encode(table: &Table, schema: Option<&TableSchema>) -> String {
    if table.is_empty() {
        return String::new();
    }

    let header = table.header();
    let columns = output_columns(&header, schema);
    let date_flags: Vec<bool> = columns
        .iter()
        .map(|(_, name)| schema.is_some_and(|s| s.is_date_column(name)))
        .collect();

    let mut lines = Vec::with_capacity(table.len());
    lines.push(
        columns
            .iter()
            .map(|(_, name)| escape_field(name))
            .collect::<Vec<_>>()
            .join(","),
    );

    for row in table.data_rows() {
        if row.iter().all(Cell::is_blank) {
            continue;
        }
        let line = columns
            .iter()
            .zip(&date_flags)
            .map(|((idx, _), &is_date)| {
                let rendered = row
                    .get(*idx)
                    .map(|cell| render_cell(cell, is_date))
                    .unwrap_or_default();
                escape_field(&rendered)
            })
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }

    lines.join(ROW_TERMINATOR)
}
