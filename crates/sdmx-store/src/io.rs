//! File primitives shared by the store and the artifact writers.
//!
//! All writes go through [`atomic_write`]: content is written to a sibling
//! temp file, synced, then renamed over the target.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Result, StoreError};

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("store"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Replace `path` with `bytes`, creating parent directories as needed.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io("create directory", parent, e))?;
    }
    let temp_path = temp_path_for(path);
    let mut file = File::create(&temp_path).map_err(|e| StoreError::io("create", &temp_path, e))?;
    file.write_all(bytes)
        .map_err(|e| StoreError::io("write", &temp_path, e))?;
    file.sync_all()
        .map_err(|e| StoreError::io("sync", &temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| StoreError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source: e,
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
    Ok(())
}

/// Write a header and string rows as a delimited file.
pub fn write_csv<R, S>(path: &Path, delimiter: u8, header: &[&str], rows: R) -> Result<()>
where
    R: IntoIterator,
    R::Item: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    writer
        .write_record(header)
        .map_err(|e| StoreError::csv(path, e))?;
    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| StoreError::csv(path, e))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| StoreError::io("flush", path, e.into_error()))?;
    atomic_write(path, &bytes)
}

/// Deserialize every row of a delimited file with a header line.
///
/// A missing file reads as no rows.
pub fn read_csv<T: DeserializeOwned>(path: &Path, delimiter: u8) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| StoreError::csv(path, e))?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record.map_err(|e| StoreError::csv(path, e))?);
    }
    Ok(rows)
}

/// Read a YAML document; a missing or empty file yields `T::default()`.
pub fn read_yaml<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let contents = fs::read_to_string(path).map_err(|e| StoreError::io("read", path, e))?;
    if contents.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| StoreError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_yaml::to_string(value).map_err(|source| StoreError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    atomic_write(path, text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[test]
    fn atomic_write_creates_parents_and_leaves_no_temp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("INDICATOR");
        atomic_write(&path, b"ID;COD\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "ID;COD\n");
        assert!(!dir.path().join("a").join("b").join("INDICATOR.tmp").exists());
    }

    #[test]
    fn csv_quotes_embedded_delimiters() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.csv");
        write_csv(&path, b';', &["A", "B"], vec![vec!["x", ""], vec!["y;z", "2"]]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "A;B\nx;\n\"y;z\";2\n");
    }

    #[test]
    fn missing_yaml_is_default() {
        let dir = tempdir().unwrap();
        let value: BTreeMap<String, String> = read_yaml(&dir.path().join("none.yaml")).unwrap();
        assert!(value.is_empty());
    }
}
