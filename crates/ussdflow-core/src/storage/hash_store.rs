//! Hash store trait.

use ussdflow_types::error::RepositoryError;

/// A single field write, used by [`HashStore::hset_batch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashWrite {
    pub key: String,
    pub field: String,
    pub value: String,
}

impl HashWrite {
    pub fn new(key: impl Into<String>, field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Trait for a durable store offering one hash map per key.
///
/// Implementations must provide at least read-your-writes consistency and
/// surface failures as errors without retrying internally.
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait HashStore: Send + Sync {
    /// Read one field of the hash at `key`. Returns None if either is absent.
    fn hget(
        &self,
        key: &str,
        field: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, RepositoryError>> + Send;

    /// Write one field of the hash at `key` (upsert).
    fn hset(
        &self,
        key: &str,
        field: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Write several fields, possibly across keys.
    ///
    /// The default applies the writes one by one in order, so a failure can
    /// leave a prefix applied. Stores that can commit all writes atomically
    /// should override this.
    fn hset_batch(
        &self,
        writes: &[HashWrite],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send {
        async move {
            for write in writes {
                self.hset(&write.key, &write.field, &write.value).await?;
            }
            Ok(())
        }
    }
}
