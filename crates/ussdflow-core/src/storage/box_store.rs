//! BoxHashStore -- object-safe, cloneable dynamic dispatch wrapper for HashStore.
//!
//! 1. Define an object-safe `HashStoreDyn` trait with boxed futures
//! 2. Blanket-impl `HashStoreDyn` for all `T: HashStore`
//! 3. `BoxHashStore` wraps `Arc<dyn HashStoreDyn>` and delegates

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use ussdflow_types::error::RepositoryError;

use super::hash_store::{HashStore, HashWrite};

/// Object-safe version of [`HashStore`] with boxed futures.
pub trait HashStoreDyn: Send + Sync {
    fn hget_boxed<'a>(
        &'a self,
        key: &'a str,
        field: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, RepositoryError>> + Send + 'a>>;

    fn hset_boxed<'a>(
        &'a self,
        key: &'a str,
        field: &'a str,
        value: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), RepositoryError>> + Send + 'a>>;

    fn hset_batch_boxed<'a>(
        &'a self,
        writes: &'a [HashWrite],
    ) -> Pin<Box<dyn Future<Output = Result<(), RepositoryError>> + Send + 'a>>;
}

impl<T: HashStore> HashStoreDyn for T {
    fn hget_boxed<'a>(
        &'a self,
        key: &'a str,
        field: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, RepositoryError>> + Send + 'a>> {
        Box::pin(self.hget(key, field))
    }

    fn hset_boxed<'a>(
        &'a self,
        key: &'a str,
        field: &'a str,
        value: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), RepositoryError>> + Send + 'a>> {
        Box::pin(self.hset(key, field, value))
    }

    fn hset_batch_boxed<'a>(
        &'a self,
        writes: &'a [HashWrite],
    ) -> Pin<Box<dyn Future<Output = Result<(), RepositoryError>> + Send + 'a>> {
        Box::pin(self.hset_batch(writes))
    }
}

/// Type-erased hash store shared by the orchestrator and every session handle.
///
/// Since `HashStore` uses RPITIT, it cannot be used as a trait object directly.
/// Cloning is cheap (one `Arc` bump).
#[derive(Clone)]
pub struct BoxHashStore {
    inner: Arc<dyn HashStoreDyn>,
}

impl BoxHashStore {
    /// Wrap a concrete `HashStore` in a type-erased handle.
    pub fn new<T: HashStore + 'static>(store: T) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    pub async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, RepositoryError> {
        self.inner.hget_boxed(key, field).await
    }

    pub async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), RepositoryError> {
        self.inner.hset_boxed(key, field, value).await
    }

    pub async fn hset_batch(&self, writes: &[HashWrite]) -> Result<(), RepositoryError> {
        self.inner.hset_batch_boxed(writes).await
    }
}

impl std::fmt::Debug for BoxHashStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxHashStore").finish_non_exhaustive()
    }
}
