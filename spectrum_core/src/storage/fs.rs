//! Local filesystem adapter.
//!
//! Keys are paths relative to a root directory. Object metadata lives in a
//! co-located `<file>.meta.json` document. Every file is written to a hidden
//! sibling first and renamed into place, so a reader never observes a
//! half-written object.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{StorageAdapter, StoredObject};
use crate::error::{SpectrumError, SpectrumResult};

/// Suffix appended to an object's file name for its metadata document.
pub const METADATA_SUFFIX: &str = ".meta.json";

#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    root: PathBuf,
}

impl FileSystemStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute or root-relative location of the object under `key`.
    pub fn path_for(&self, key: &str) -> SpectrumResult<PathBuf> {
        if key.trim().is_empty() {
            return Err(SpectrumError::storage(
                "resolve",
                key,
                io::Error::new(io::ErrorKind::InvalidInput, "key must not be empty"),
            ));
        }
        Ok(self.root.join(key))
    }

    fn metadata_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(METADATA_SUFFIX);
        path.with_file_name(name)
    }
}

impl StorageAdapter for FileSystemStorage {
    fn fetch(&self, key: &str) -> SpectrumResult<StoredObject> {
        let path = self.path_for(key)?;
        let bytes = fs::read(&path).map_err(|err| SpectrumError::storage("fetch", key, err))?;

        let metadata = match fs::read(Self::metadata_path(&path)) {
            Ok(raw) => serde_json::from_slice::<BTreeMap<String, String>>(&raw).map_err(|err| {
                SpectrumError::storage(
                    "fetch metadata",
                    key,
                    io::Error::new(io::ErrorKind::InvalidData, err),
                )
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(SpectrumError::storage("fetch metadata", key, err)),
        };

        debug!(key, path = %path.display(), bytes = bytes.len(), "fetched object");
        Ok(StoredObject { bytes, metadata })
    }

    fn store(&self, key: &str, object: StoredObject) -> SpectrumResult<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| SpectrumError::storage("store", key, err))?;
            }
        }

        // Metadata first: a visible object always has its metadata in place.
        let metadata_path = Self::metadata_path(&path);
        if object.metadata.is_empty() {
            match fs::remove_file(&metadata_path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(SpectrumError::storage("store metadata", key, err)),
            }
        } else {
            let document = serde_json::to_vec_pretty(&object.metadata).map_err(|err| {
                SpectrumError::storage(
                    "store metadata",
                    key,
                    io::Error::new(io::ErrorKind::InvalidData, err),
                )
            })?;
            write_atomically(&metadata_path, &document)
                .map_err(|err| SpectrumError::storage("store metadata", key, err))?;
        }

        write_atomically(&path, &object.bytes)
            .map_err(|err| SpectrumError::storage("store", key, err))?;
        debug!(key, path = %path.display(), bytes = object.bytes.len(), "stored object");
        Ok(())
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path has no file name")
    })?;
    let mut partial_name = std::ffi::OsString::from(".");
    partial_name.push(file_name);
    partial_name.push(".partial");
    let partial = path.with_file_name(partial_name);

    let result = (|| -> io::Result<()> {
        let mut file = fs::File::create(&partial)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&partial, path)
    })();
    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}
