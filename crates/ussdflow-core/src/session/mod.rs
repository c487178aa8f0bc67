//! Per-conversation session handle.
//!
//! A `Session` is a thin, cloneable view over two hashes in the store:
//!
//! - `{prefix}{id}:{meta_namespace}` holds `Screen`, `Position` and `Salt`
//! - `{prefix}{id}:{input_namespace}` holds collected values keyed by input name
//!
//! Nothing is cached across requests. The only state the handle carries is
//! the salt read when it was opened.

pub mod lock;

use ussdflow_types::config::FlowConfig;
use ussdflow_types::error::{ContractViolation, FlowError, RepositoryError};
use ussdflow_types::session::{FIELD_POSITION, FIELD_SALT, FIELD_SCREEN, ScreenId, SessionId};

use crate::cipher::BoxValueCipher;
use crate::storage::{BoxHashStore, HashWrite};

/// Store keys for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKeys {
    prefix: String,
    session_id: String,
    pub input_data: String,
    pub meta: String,
}

impl SessionKeys {
    pub fn new(config: &FlowConfig, id: &SessionId) -> Self {
        let prefix = config.key_prefix.clone();
        Self {
            input_data: format!("{prefix}{id}:{}", config.input_namespace),
            meta: format!("{prefix}{id}:{}", config.meta_namespace),
            session_id: id.to_string(),
            prefix,
        }
    }

    /// Key for an application-owned hash scoped to this session.
    pub fn namespaced(&self, namespace: &str) -> String {
        format!("{}{}:{namespace}", self.prefix, self.session_id)
    }
}

/// Screen and cursor as read at the start of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub screen: ScreenId,
    pub cursor: usize,
}

/// Handle to one session's durable state.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    keys: SessionKeys,
    store: BoxHashStore,
    cipher: BoxValueCipher,
    salt: String,
}

impl Session {
    /// Assemble a handle without touching the store.
    pub fn from_parts(
        keys: SessionKeys,
        id: SessionId,
        store: BoxHashStore,
        cipher: BoxValueCipher,
        salt: String,
    ) -> Self {
        Self {
            id,
            keys,
            store,
            cipher,
            salt,
        }
    }

    /// Open an existing session. Returns `None` if the store holds no record.
    pub async fn load(
        id: SessionId,
        keys: SessionKeys,
        store: BoxHashStore,
        cipher: BoxValueCipher,
    ) -> Result<Option<(Self, SessionState)>, FlowError> {
        let Some(screen) = store.hget(&keys.meta, FIELD_SCREEN).await? else {
            return Ok(None);
        };
        let cursor = parse_cursor(store.hget(&keys.meta, FIELD_POSITION).await?)?;
        let salt = store
            .hget(&keys.meta, FIELD_SALT)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("{} {FIELD_SALT}", keys.meta)))?;

        let session = Self::from_parts(keys, id, store, cipher, salt);
        let state = SessionState {
            screen: ScreenId::new(screen),
            cursor,
        };
        Ok(Some((session, state)))
    }

    /// Create a session positioned on `root` with a fresh salt.
    ///
    /// Screen, cursor and salt are written in one batch.
    pub async fn create(
        id: SessionId,
        keys: SessionKeys,
        store: BoxHashStore,
        cipher: BoxValueCipher,
        root: &ScreenId,
    ) -> Result<Self, FlowError> {
        let salt = cipher.generate_salt();
        store
            .hset_batch(&[
                HashWrite::new(&keys.meta, FIELD_SCREEN, root.as_str()),
                HashWrite::new(&keys.meta, FIELD_POSITION, "0"),
                HashWrite::new(&keys.meta, FIELD_SALT, &salt),
            ])
            .await?;

        Ok(Self::from_parts(keys, id, store, cipher, salt))
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// Raw store access for behaviors that keep their own data.
    pub fn store(&self) -> &BoxHashStore {
        &self.store
    }

    /// Re-read the input cursor from the store. A missing field reads as 0.
    pub async fn cursor(&self) -> Result<usize, FlowError> {
        parse_cursor(self.store.hget(&self.keys.meta, FIELD_POSITION).await?)
    }

    /// Re-read the active screen id from the store.
    pub async fn current_screen(&self) -> Result<Option<ScreenId>, FlowError> {
        Ok(self
            .store
            .hget(&self.keys.meta, FIELD_SCREEN)
            .await?
            .map(ScreenId::new))
    }

    /// Persist a new input cursor.
    pub async fn set_cursor(&self, cursor: usize) -> Result<(), FlowError> {
        self.store
            .hset(&self.keys.meta, FIELD_POSITION, &cursor.to_string())
            .await?;
        Ok(())
    }

    /// Point the session at `screen` and rewind the cursor, in one batch.
    pub async fn move_to(&self, screen: &ScreenId) -> Result<(), FlowError> {
        self.store
            .hset_batch(&[
                HashWrite::new(&self.keys.meta, FIELD_SCREEN, screen.as_str()),
                HashWrite::new(&self.keys.meta, FIELD_POSITION, "0"),
            ])
            .await?;
        Ok(())
    }

    /// Read a collected value exactly as stored (ciphertext for encrypted inputs).
    pub async fn stored_value(&self, name: &str) -> Result<Option<String>, FlowError> {
        Ok(self.store.hget(&self.keys.input_data, name).await?)
    }

    pub async fn encrypt(&self, plaintext: &str) -> Result<String, FlowError> {
        Ok(self.cipher.encrypt(plaintext, &self.salt).await?)
    }

    pub async fn decrypt(&self, ciphertext: &str) -> Result<String, FlowError> {
        Ok(self.cipher.decrypt(ciphertext, &self.salt).await?)
    }
}

fn parse_cursor(raw: Option<String>) -> Result<usize, FlowError> {
    match raw {
        None => Ok(0),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ContractViolation::CorruptCursor(raw).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockCipher, MockStore, TEST_SALT};

    fn keys(id: &str) -> SessionKeys {
        SessionKeys::new(&FlowConfig::default(), &SessionId::new(id))
    }

    #[test]
    fn test_keys_use_prefix_and_namespaces() {
        let keys = keys("abc");
        assert_eq!(keys.meta, "ussd:abc:Session");
        assert_eq!(keys.input_data, "ussd:abc:InputData");
        assert_eq!(keys.namespaced("Profile"), "ussd:abc:Profile");
    }

    #[tokio::test]
    async fn test_load_missing_session_returns_none() {
        let store = MockStore::default();
        let loaded = Session::load(
            SessionId::new("abc"),
            keys("abc"),
            BoxHashStore::new(store.clone()),
            BoxValueCipher::new(MockCipher),
        )
        .await
        .unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_create_then_load() {
        let store = MockStore::default();
        let created = Session::create(
            SessionId::new("abc"),
            keys("abc"),
            BoxHashStore::new(store.clone()),
            BoxValueCipher::new(MockCipher),
            &ScreenId::from("main"),
        )
        .await
        .unwrap();
        assert_eq!(created.salt(), TEST_SALT);
        assert_eq!(store.get("ussd:abc:Session", "Screen").as_deref(), Some("main"));
        assert_eq!(store.get("ussd:abc:Session", "Position").as_deref(), Some("0"));

        let (session, state) = Session::load(
            SessionId::new("abc"),
            keys("abc"),
            BoxHashStore::new(store.clone()),
            BoxValueCipher::new(MockCipher),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(session.salt(), TEST_SALT);
        assert_eq!(state.screen, ScreenId::from("main"));
        assert_eq!(state.cursor, 0);
    }

    #[tokio::test]
    async fn test_load_without_salt_is_store_error() {
        let store = MockStore::default();
        store.put("ussd:abc:Session", "Screen", "main");
        let err = Session::load(
            SessionId::new("abc"),
            keys("abc"),
            BoxHashStore::new(store.clone()),
            BoxValueCipher::new(MockCipher),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FlowError::Store(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_corrupt_cursor_is_contract_violation() {
        let store = MockStore::default();
        let session = crate::testing::session(&store, "abc");
        store.put("ussd:abc:Session", "Position", "two");
        let err = session.cursor().await.unwrap_err();
        assert!(matches!(
            err,
            FlowError::Contract(ContractViolation::CorruptCursor(_))
        ));
    }

    #[tokio::test]
    async fn test_move_to_rewinds_cursor() {
        let store = MockStore::default();
        let session = crate::testing::session(&store, "abc");
        session.set_cursor(2).await.unwrap();
        session.move_to(&ScreenId::from("done")).await.unwrap();

        assert_eq!(session.cursor().await.unwrap(), 0);
        assert_eq!(
            session.current_screen().await.unwrap(),
            Some(ScreenId::from("done"))
        );
    }

    #[tokio::test]
    async fn test_encrypt_uses_session_salt() {
        let store = MockStore::default();
        let session = crate::testing::session(&store, "abc");
        let ciphertext = session.encrypt("1234").await.unwrap();
        assert_eq!(ciphertext, "enc[salt-1]:4321");
        assert_eq!(session.decrypt(&ciphertext).await.unwrap(), "1234");
    }
}
