use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::debug;

use super::{TableSink, TableSource};
use crate::error::Result;
use crate::table::Table;

/// Tables stored as `<dir>/<table>.json`.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Open a store at `dir`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .map_err(|e| io::Error::new(e.kind(), format!("creating {:?}: {}", dir, e)))?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, table_name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", table_name))
    }
}

impl TableSource for DirStore {
    fn read_table(&self, name: &str) -> Result<Option<Table>> {
        let path = self.path_for(name);
        if !path.exists() {
            return Ok(None);
        }
        let f = fs::File::open(&path)
            .map_err(|e| io::Error::new(e.kind(), format!("opening {:?}: {}", path, e)))?;
        let table: Table = serde_json::from_reader(io::BufReader::new(f))?;
        Ok(Some(table))
    }
}

impl TableSink for DirStore {
    /// Write atomically: to a hidden tmp file, then rename over the original.
    fn write_table(&mut self, name: &str, table: Table) -> Result<()> {
        let path = self.path_for(name);
        let tmp_path = self.dir.join(format!(".{}.json.tmp", name));

        let mut tmp = fs::File::create(&tmp_path)
            .map_err(|e| io::Error::new(e.kind(), format!("creating {:?}: {}", tmp_path, e)))?;
        serde_json::to_writer_pretty(&mut tmp, &table)?;
        tmp.write_all(b"\n")?;
        tmp.sync_all()?;
        drop(tmp);

        fs::rename(&tmp_path, &path).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("renaming {:?} -> {:?}: {}", tmp_path, path, e),
            )
        })?;
        debug!(table = name, rows = table.len(), path = %path.display(), "table written");
        Ok(())
    }
}
