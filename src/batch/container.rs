use std::io::{Cursor, Read, Write};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{BundleError, Result};

pub const CSV_EXTENSION: &str = ".csv";

/// One named file inside a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerEntry {
    pub name: String,
    pub data: Vec<u8>,
}

/// Bundle named blobs into an in-memory ZIP archive.
pub fn pack<'a, I>(entries: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, data) in entries {
        zip.start_file(name, options)?;
        zip.write_all(data)?;
    }
    Ok(zip.finish()?.into_inner())
}

/// Read every file entry of a ZIP archive into memory, in archive order.
pub fn unpack(bytes: &[u8]) -> Result<Vec<ContainerEntry>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| BundleError::InvalidContainer(e.to_string()))?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| {
            BundleError::InvalidContainer(format!("failed to access entry #{}: {}", i, e))
        })?;
        if !entry.is_file() {
            continue;
        }
        let name = entry.name().to_string();
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut data)
            .map_err(|e| BundleError::InvalidContainer(format!("failed to read {}: {}", name, e)))?;
        entries.push(ContainerEntry { name, data });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_then_unpack() -> anyhow::Result<()> {
        let bytes = pack([("a.csv", &b"x,y"[..]), ("notes.txt", &b"hi"[..])])?;
        let entries = unpack(&bytes)?;
        assert_eq!(
            entries,
            vec![
                ContainerEntry {
                    name: "a.csv".into(),
                    data: b"x,y".to_vec()
                },
                ContainerEntry {
                    name: "notes.txt".into(),
                    data: b"hi".to_vec()
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn garbage_is_an_invalid_container() {
        assert!(matches!(
            unpack(b"definitely not a zip"),
            Err(BundleError::InvalidContainer(_))
        ));
    }
}
