//! File-based key-value store adapter.
//!
//! Each key maps to one JSON file inside a data directory. Writes go to a
//! sibling temp file first and are renamed into place, so a crash mid-write
//! never leaves a truncated blob behind.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::traits::KeyValueStore;

/// File-based key-value store.
///
/// Keys are mapped to file names by replacing every character outside
/// `[A-Za-z0-9._-]` with `_`, so the namespaced key
/// `llm-powered-chat-platform::threads` is stored as
/// `llm-powered-chat-platform__threads.json`.
///
/// # Example
///
/// ```ignore
/// use colloq::adapters::FileKeyValueStore;
/// use colloq::traits::KeyValueStore;
///
/// let store = FileKeyValueStore::new("/home/me/.local/share/colloq");
/// store.set("app::threads", "{}")?;
/// ```
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    data_dir: PathBuf,
}

impl FileKeyValueStore {
    /// Create a store rooted at `data_dir`. The directory is created lazily
    /// on the first write.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Get the data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let name = sanitize_key(key)?;
        Ok(self.data_dir.join(format!("{}.json", name)))
    }
}

fn sanitize_key(key: &str) -> Result<String, StorageError> {
    let trimmed = key.trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(trimmed
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect())
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let write_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| StorageError::Write { path, source }
        };

        fs::create_dir_all(&self.data_dir).map_err(write_err(&self.data_dir))?;

        let tmp_path = path.with_extension("json.tmp");
        let file = File::create(&tmp_path).map_err(write_err(&tmp_path))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(value.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(write_err(&tmp_path))?;
        drop(writer);

        fs::rename(&tmp_path, &path).map_err(write_err(&path))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Write { path, source }),
        }
    }
}
