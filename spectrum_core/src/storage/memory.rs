//! In-memory adapter backed by a mutex-guarded map.

use std::collections::BTreeMap;
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{StorageAdapter, StoredObject};
use crate::error::{SpectrumError, SpectrumResult};

/// In-process object store, used for tests and for embedding the pipeline
/// where outputs are consumed directly from memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    objects: Mutex<BTreeMap<String, StoredObject>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw bytes without metadata.
    pub fn insert(&self, key: impl Into<String>, bytes: Vec<u8>) {
        self.objects().insert(key.into(), StoredObject::new(bytes));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.objects().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects().is_empty()
    }

    fn objects(&self) -> MutexGuard<'_, BTreeMap<String, StoredObject>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageAdapter for MemoryStorage {
    fn fetch(&self, key: &str) -> SpectrumResult<StoredObject> {
        self.objects().get(key).cloned().ok_or_else(|| {
            SpectrumError::storage(
                "fetch",
                key,
                io::Error::new(io::ErrorKind::NotFound, "no such object"),
            )
        })
    }

    fn store(&self, key: &str, object: StoredObject) -> SpectrumResult<()> {
        if key.is_empty() {
            return Err(SpectrumError::storage(
                "store",
                key,
                io::Error::new(io::ErrorKind::InvalidInput, "key must not be empty"),
            ));
        }
        self.objects().insert(key.to_string(), object);
        Ok(())
    }
}
