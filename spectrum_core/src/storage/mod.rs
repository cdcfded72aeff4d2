//! Byte-blob persistence with per-object string metadata.
//!
//! The pipeline never touches the filesystem or network directly; it is
//! handed a [`StorageAdapter`] at construction time. Adapters report
//! failures as [`SpectrumError::Storage`](crate::SpectrumError::Storage) and
//! do not retry.

pub mod fs;
pub mod memory;

use std::collections::BTreeMap;

use crate::error::SpectrumResult;

pub use self::fs::FileSystemStorage;
pub use self::memory::MemoryStorage;

/// An object as held by a storage backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub metadata: BTreeMap<String, String>,
}

impl StoredObject {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata.extend(metadata);
        self
    }
}

/// Fetches and stores objects addressed by string keys.
pub trait StorageAdapter {
    /// Reads the object under `key` together with its metadata.
    fn fetch(&self, key: &str) -> SpectrumResult<StoredObject>;

    /// Publishes `object` under `key`, replacing any previous object and its
    /// metadata.
    fn store(&self, key: &str, object: StoredObject) -> SpectrumResult<()>;
}

impl<T: StorageAdapter + ?Sized> StorageAdapter for &T {
    fn fetch(&self, key: &str) -> SpectrumResult<StoredObject> {
        (**self).fetch(key)
    }

    fn store(&self, key: &str, object: StoredObject) -> SpectrumResult<()> {
        (**self).store(key, object)
    }
}

impl<T: StorageAdapter + ?Sized> StorageAdapter for Box<T> {
    fn fetch(&self, key: &str) -> SpectrumResult<StoredObject> {
        (**self).fetch(key)
    }

    fn store(&self, key: &str, object: StoredObject) -> SpectrumResult<()> {
        (**self).store(key, object)
    }
}
