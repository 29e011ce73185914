//! Local filesystem primitives used by the repositories.
//!
//! Writes go through a temporary file in the destination directory and are
//! persisted with a rename, so readers never observe a half-written
//! descriptor or image.

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;

use crate::error::{StorageError, StorageResult};

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// File or directory name.
    pub name: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

impl ListEntry {
    /// Name without its final extension.
    pub fn stem(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.name)
    }

    /// Final extension of the name, if any.
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
    }
}

/// Whether anything exists at `path`.
pub fn exists(path: &Path) -> StorageResult<bool> {
    path.try_exists().map_err(|err| StorageError::io(path, err))
}

/// Read and deserialise a JSON descriptor.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<T> {
    let content = fs::read(path).map_err(|err| StorageError::io(path, err))?;
    serde_json::from_slice(&content).map_err(|err| StorageError::json(path, err))
}

/// Serialise `value` as pretty JSON and write it atomically.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
    let serialised =
        serde_json::to_vec_pretty(value).map_err(|err| StorageError::json(path, err))?;
    write_bytes(path, &serialised)
}

/// Read a whole file.
pub fn read_bytes(path: &Path) -> StorageResult<Vec<u8>> {
    fs::read(path).map_err(|err| StorageError::io(path, err))
}

/// Write a whole file atomically, creating parent directories as needed.
pub fn write_bytes(path: &Path, data: &[u8]) -> StorageResult<()> {
    let parent = path
        .parent()
        .ok_or_else(|| StorageError::io(path, io::Error::other("path has no parent")))?;
    fs::create_dir_all(parent).map_err(|err| StorageError::io(parent, err))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|err| StorageError::io(parent, err))?;
    tmp.write_all(data)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|err| StorageError::io(path, err))?;
    tmp.persist(path)
        .map_err(|err| StorageError::io(path, err.error))?;
    Ok(())
}

/// Move a file or directory. The destination must not exist yet.
pub fn move_path(from: &Path, to: &Path) -> StorageResult<()> {
    if exists(to)? {
        return Err(StorageError::io(
            to,
            io::Error::new(io::ErrorKind::AlreadyExists, "destination already exists"),
        ));
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|err| StorageError::io(parent, err))?;
    }
    fs::rename(from, to).map_err(|err| StorageError::io(from, err))
}

/// Remove a file or a whole directory tree. Missing paths are an error.
pub fn remove(path: &Path) -> StorageResult<()> {
    let metadata = fs::symlink_metadata(path).map_err(|err| StorageError::io(path, err))?;
    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|err| StorageError::io(path, err))
}

/// List a directory sorted by name. A missing directory lists as empty.
pub fn list(dir: &Path) -> StorageResult<Vec<ListEntry>> {
    if !exists(dir)? {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(|err| StorageError::io(dir, err))? {
        let entry = entry.map_err(|err| StorageError::io(dir, err))?;
        let is_dir = entry
            .file_type()
            .map_err(|err| StorageError::io(entry.path(), err))?
            .is_dir();
        entries.push(ListEntry {
            name: entry.file_name().to_string_lossy().to_string(),
            is_dir,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}
