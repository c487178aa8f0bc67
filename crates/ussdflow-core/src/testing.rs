//! Hand-written store and cipher doubles shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ussdflow_types::config::FlowConfig;
use ussdflow_types::error::{CipherError, RepositoryError};
use ussdflow_types::session::SessionId;

use crate::cipher::{BoxValueCipher, ValueCipher};
use crate::session::{Session, SessionKeys};
use crate::storage::{BoxHashStore, HashStore};

#[derive(Default)]
struct MockStoreInner {
    values: Mutex<HashMap<(String, String), String>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    write_count: AtomicUsize,
}

/// In-memory store with failure injection. Clones share state.
#[derive(Clone, Default)]
pub struct MockStore {
    inner: Arc<MockStoreInner>,
}

impl MockStore {
    pub fn get(&self, key: &str, field: &str) -> Option<String> {
        self.inner
            .values
            .lock()
            .unwrap()
            .get(&(key.to_string(), field.to_string()))
            .cloned()
    }

    pub fn put(&self, key: &str, field: &str, value: &str) {
        self.inner
            .values
            .lock()
            .unwrap()
            .insert((key.to_string(), field.to_string()), value.to_string());
    }

    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn write_count(&self) -> usize {
        self.inner.write_count.load(Ordering::SeqCst)
    }
}

impl HashStore for MockStore {
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, RepositoryError> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection);
        }
        Ok(self.get(key, field))
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), RepositoryError> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Query("write refused".to_string()));
        }
        self.inner.write_count.fetch_add(1, Ordering::SeqCst);
        self.put(key, field, value);
        Ok(())
    }
}

/// Reversible, obviously-not-plaintext cipher: `enc[salt]:` + reversed text.
pub struct MockCipher;

impl ValueCipher for MockCipher {
    async fn encrypt(&self, plaintext: &str, salt: &str) -> Result<String, CipherError> {
        Ok(format!("enc[{salt}]:{}", plaintext.chars().rev().collect::<String>()))
    }

    async fn decrypt(&self, ciphertext: &str, salt: &str) -> Result<String, CipherError> {
        let body = ciphertext
            .strip_prefix(&format!("enc[{salt}]:"))
            .ok_or(CipherError::DecryptionFailed)?;
        Ok(body.chars().rev().collect())
    }

    fn generate_salt(&self) -> String {
        "salt-1".to_string()
    }
}

pub const TEST_SALT: &str = "salt-1";

/// A session handle over `store`, with no metadata written.
pub fn session(store: &MockStore, id: &str) -> Session {
    let id = SessionId::new(id);
    Session::from_parts(
        SessionKeys::new(&FlowConfig::default(), &id),
        id,
        BoxHashStore::new(store.clone()),
        BoxValueCipher::new(MockCipher),
        TEST_SALT.to_string(),
    )
}
