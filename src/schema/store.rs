use anyhow::{Context, Result};
use glob::glob;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use super::types::{SchemaFile, TableSchema};
use crate::error::BundleError;

/// Lookup of declared table schemas.
pub trait SchemaResolver: Sync {
    fn get_by_name(&self, table_name: &str) -> Option<&TableSchema>;

    /// Every known table name, in registration order.
    fn table_names(&self) -> Vec<&str>;
}

/// In-memory registry of table schemas, keyed by table name.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    tables: Vec<TableSchema>,
    by_name: HashMap<String, usize>,
}

const SCHEMA_SUFFIXES: &[&str] = &["_schema.json", "_schema.yaml", "_schema.yml"];

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, schema: TableSchema) -> Result<(), BundleError> {
        if self.by_name.contains_key(schema.name()) {
            return Err(BundleError::DuplicateTable(schema.name().to_string()));
        }
        self.by_name
            .insert(schema.name().to_string(), self.tables.len());
        self.tables.push(schema);
        Ok(())
    }

    pub fn with(mut self, schema: TableSchema) -> Result<Self, BundleError> {
        self.register(schema)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Load every `<table>_schema.{json,yaml,yml}` in `dir`, sorted by file name.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            anyhow::bail!(
                "schema dir `{}` does not exist or is not a directory",
                dir.display()
            );
        }

        let pattern = format!("{}/*_schema.*", dir.display());
        let mut files: Vec<PathBuf> = glob(&pattern)
            .context("invalid glob pattern for schema dir")?
            .filter_map(|entry| entry.ok())
            .filter(|p| p.is_file())
            .collect();
        files.sort();

        let mut registry = Self::new();
        for path in files {
            let fname = match path.file_name().and_then(|n| n.to_str()) {
                Some(f) => f,
                None => continue,
            };
            let Some(suffix) = SCHEMA_SUFFIXES.iter().copied().find(|s| fname.ends_with(s)) else {
                debug!(file = %fname, "not a schema file, skipping");
                continue;
            };
            let table = fname.strip_suffix(suffix).unwrap_or(fname).to_string();

            let text =
                fs::read_to_string(&path).with_context(|| format!("reading {:?}", path))?;
            let parsed: SchemaFile = if suffix.ends_with(".json") {
                serde_json::from_str(&text).with_context(|| format!("parsing {:?}", path))?
            } else {
                serde_yaml::from_str(&text).with_context(|| format!("parsing {:?}", path))?
            };

            let schema = TableSchema::new(table, parsed.table_type, parsed.columns)
                .with_context(|| format!("invalid schema in {:?}", path))?;
            registry
                .register(schema)
                .with_context(|| format!("registering {:?}", path))?;
        }

        info!(tables = registry.len(), dir = %dir.display(), "loaded table schemas");
        Ok(registry)
    }
}

impl SchemaResolver for SchemaRegistry {
    fn get_by_name(&self, table_name: &str) -> Option<&TableSchema> {
        self.by_name.get(table_name).map(|&i| &self.tables[i])
    }

    fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(TableSchema::name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnDef, TableType};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn register_keeps_order_and_rejects_duplicates() -> Result<()> {
        let mut reg = SchemaRegistry::new()
            .with(TableSchema::new("b", TableType::Log, vec![ColumnDef::text("x")])?)?
            .with(TableSchema::new("a", TableType::Log, vec![ColumnDef::text("x")])?)?;
        assert!(SchemaRegistry::new().is_empty());
        assert!(!reg.is_empty());
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.table_names(), vec!["b", "a"]);
        assert!(reg.get_by_name("a").is_some());
        assert!(reg.get_by_name("c").is_none());

        let dup = TableSchema::new("a", TableType::Metadata, vec![])?;
        assert!(matches!(
            reg.register(dup),
            Err(BundleError::DuplicateTable(ref n)) if n == "a"
        ));
        Ok(())
    }

    #[test]
    fn loads_json_and_yaml_files() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("products_schema.json"),
            r#"{"type":"MASTER_DATA","columns":[{"name":"sku"},{"name":"added","date":true}]}"#,
        )?;
        fs::write(
            dir.path().join("audit_schema.yaml"),
            "type: LOG\ncolumns:\n  - name: at\n    date: true\n  - name: message\n",
        )?;
        fs::write(dir.path().join("README.txt"), "not a schema")?;

        let reg = SchemaRegistry::load_dir(dir.path())?;
        assert_eq!(reg.table_names(), vec!["audit", "products"]);

        let products = reg.get_by_name("products").unwrap();
        assert_eq!(products.table_type(), TableType::MasterData);
        assert!(products.is_date_column("added"));

        let audit = reg.get_by_name("audit").unwrap();
        assert_eq!(audit.column_names().collect::<Vec<_>>(), vec!["at", "message"]);
        Ok(())
    }

    #[test]
    fn duplicate_columns_fail_the_load() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("bad_schema.json"),
            r#"{"type":"LOG","columns":[{"name":"a"},{"name":"a"}]}"#,
        )?;
        let err = SchemaRegistry::load_dir(dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("declared more than once"));
        Ok(())
    }

    #[test]
    fn missing_dir_is_an_error() {
        assert!(SchemaRegistry::load_dir("/definitely/not/here").is_err());
    }
}
