use std::collections::HashSet;
use tracing::{info, instrument};

use super::{container, CsvPayload};
use crate::codec::encode;
use crate::error::{BundleError, Result};
use crate::schema::{SchemaResolver, TableType};
use crate::storage::TableSource;

/// Encode every known table whose type is in `type_filter`.
///
/// Tables missing from storage or holding no rows are skipped. Fails with
/// `NoData` when nothing was encoded.
#[instrument(level = "info", skip_all, fields(types = ?type_filter))]
pub fn export_selected<S, R>(
    resolver: &S,
    type_filter: &HashSet<TableType>,
    reader: &R,
) -> Result<Vec<CsvPayload>>
where
    S: SchemaResolver + ?Sized,
    R: TableSource + ?Sized,
{
    let mut payloads = Vec::new();

    for table_name in resolver.table_names() {
        let Some(schema) = resolver.get_by_name(table_name) else {
            continue;
        };
        if !type_filter.contains(&schema.table_type()) {
            continue;
        }

        let table = match reader.read_table(table_name)? {
            Some(t) => t,
            None => {
                info!(table = table_name, "table not found, skipping");
                continue;
            }
        };
        if table.is_empty() {
            info!(table = table_name, "table is empty, skipping");
            continue;
        }

        let csv = encode(&table, Some(schema));
        info!(table = table_name, rows = table.len(), "exported");
        payloads.push(CsvPayload {
            table_name: table_name.to_string(),
            csv,
        });
    }

    if payloads.is_empty() {
        return Err(BundleError::NoData);
    }
    Ok(payloads)
}

/// `export_selected` packed into a ZIP with one `<table>.csv` per table.
pub fn export_bundle<S, R>(
    resolver: &S,
    type_filter: &HashSet<TableType>,
    reader: &R,
) -> Result<Vec<u8>>
where
    S: SchemaResolver + ?Sized,
    R: TableSource + ?Sized,
{
    let payloads = export_selected(resolver, type_filter, reader)?;
    let names: Vec<String> = payloads.iter().map(CsvPayload::file_name).collect();
    let bytes = container::pack(
        names
            .iter()
            .zip(&payloads)
            .map(|(name, p)| (name.as_str(), p.csv.as_bytes())),
    )?;
    info!(tables = payloads.len(), bytes = bytes.len(), "bundle packed");
    Ok(bytes)
}

/// Encode one stored table, with its schema when the resolver knows it.
pub fn export_table<S, R>(resolver: &S, reader: &R, table_name: &str) -> Result<String>
where
    S: SchemaResolver + ?Sized,
    R: TableSource + ?Sized,
{
    let table = reader
        .read_table(table_name)?
        .ok_or_else(|| BundleError::TableNotFound(table_name.to_string()))?;
    if table.is_empty() {
        return Err(BundleError::EmptyInput);
    }
    Ok(encode(&table, resolver.get_by_name(table_name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::container::unpack;
    use crate::schema::{ColumnDef, SchemaRegistry, TableSchema};
    use crate::storage::MemoryStore;
    use crate::table::Table;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new()
            .with(
                TableSchema::new(
                    "products",
                    TableType::MasterData,
                    vec![ColumnDef::text("sku"), ColumnDef::text("name")],
                )
                .unwrap(),
            )
            .unwrap()
            .with(
                TableSchema::new(
                    "suppliers",
                    TableType::MasterData,
                    vec![ColumnDef::text("id")],
                )
                .unwrap(),
            )
            .unwrap()
            .with(
                TableSchema::new(
                    "orders",
                    TableType::TransactionData,
                    vec![ColumnDef::text("id"), ColumnDef::date("placed")],
                )
                .unwrap(),
            )
            .unwrap()
            .with(
                TableSchema::new("warehouses", TableType::MasterData, vec![ColumnDef::text("id")])
                    .unwrap(),
            )
            .unwrap()
    }

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_table(
                "products",
                Table::from_strings(vec![vec!["name", "sku"], vec!["Bolt", "B-1"]]),
            )
            .with_table("suppliers", Table::default())
            .with_table(
                "orders",
                Table::from_strings(vec![vec!["id", "placed"], vec!["1", "2024-01-01"]]),
            )
    }

    #[test]
    fn filter_selects_master_data_only() -> anyhow::Result<()> {
        let filter: HashSet<_> = [TableType::MasterData].into_iter().collect();
        let payloads = export_selected(&registry(), &filter, &store())?;
        assert_eq!(
            payloads,
            vec![CsvPayload {
                table_name: "products".into(),
                csv: "sku,name\r\nB-1,Bolt".into(),
            }]
        );
        Ok(())
    }

    #[test]
    fn nothing_to_export_is_no_data() {
        let filter: HashSet<_> = [TableType::Log].into_iter().collect();
        assert!(matches!(
            export_selected(&registry(), &filter, &store()),
            Err(BundleError::NoData)
        ));
    }

    #[test]
    fn bundle_holds_one_csv_per_table() -> anyhow::Result<()> {
        let bytes = export_bundle(&registry(), &TableType::default_export_set(), &store())?;
        let entries = unpack(&bytes)?;
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["products.csv", "orders.csv"]);
        assert_eq!(
            String::from_utf8(entries[1].data.clone())?,
            "id,placed\r\n1,2024-01-01T00:00:00.000Z"
        );
        Ok(())
    }

    #[test]
    fn single_table_export() -> anyhow::Result<()> {
        let reg = registry();
        let store = store().with_table(
            "scratch",
            Table::from_strings(vec![vec!["b", "a"], vec!["2", "1"]]),
        );
        assert_eq!(export_table(&reg, &store, "products")?, "sku,name\r\nB-1,Bolt");
        assert_eq!(export_table(&reg, &store, "scratch")?, "b,a\r\n2,1");
        assert!(matches!(
            export_table(&reg, &store, "nope"),
            Err(BundleError::TableNotFound(_))
        ));
        assert!(matches!(
            export_table(&reg, &store, "suppliers"),
            Err(BundleError::EmptyInput)
        ));
        Ok(())
    }
}
