//! In-memory hash store.
//!
//! Nothing survives the process. Used by the ephemeral simulator and tests.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use ussdflow_core::storage::{HashStore, HashWrite};
use ussdflow_types::error::RepositoryError;

/// `HashStore` over a concurrent map of hashes.
///
/// Clones share the same data.
#[derive(Clone, Debug, Default)]
pub struct MemoryHashStore {
    hashes: Arc<DashMap<String, HashMap<String, String>>>,
}

impl MemoryHashStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of hash keys currently held.
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    fn write(&self, key: &str, field: &str, value: &str) {
        self.hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
    }
}

impl HashStore for MemoryHashStore {
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, RepositoryError> {
        Ok(self
            .hashes
            .get(key)
            .and_then(|hash| hash.get(field).cloned()))
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), RepositoryError> {
        self.write(key, field, value);
        Ok(())
    }

    // No await between writes: the batch cannot fail halfway.
    async fn hset_batch(&self, writes: &[HashWrite]) -> Result<(), RepositoryError> {
        for write in writes {
            self.write(&write.key, &write.field, &write.value);
        }
        Ok(())
    }
}
