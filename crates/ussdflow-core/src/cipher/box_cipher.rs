//! BoxValueCipher -- object-safe dynamic dispatch wrapper for ValueCipher.
//!
//! Follows the same blanket-impl pattern as BoxHashStore.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use ussdflow_types::error::CipherError;

use super::ValueCipher;

/// Object-safe version of [`ValueCipher`] with boxed futures.
pub trait ValueCipherDyn: Send + Sync {
    fn encrypt_boxed<'a>(
        &'a self,
        plaintext: &'a str,
        salt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, CipherError>> + Send + 'a>>;

    fn decrypt_boxed<'a>(
        &'a self,
        ciphertext: &'a str,
        salt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, CipherError>> + Send + 'a>>;

    fn generate_salt_dyn(&self) -> String;
}

impl<T: ValueCipher> ValueCipherDyn for T {
    fn encrypt_boxed<'a>(
        &'a self,
        plaintext: &'a str,
        salt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, CipherError>> + Send + 'a>> {
        Box::pin(self.encrypt(plaintext, salt))
    }

    fn decrypt_boxed<'a>(
        &'a self,
        ciphertext: &'a str,
        salt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, CipherError>> + Send + 'a>> {
        Box::pin(self.decrypt(ciphertext, salt))
    }

    fn generate_salt_dyn(&self) -> String {
        ValueCipher::generate_salt(self)
    }
}

/// Type-erased, cloneable value cipher.
#[derive(Clone)]
pub struct BoxValueCipher {
    inner: Arc<dyn ValueCipherDyn>,
}

impl BoxValueCipher {
    /// Wrap a concrete `ValueCipher` in a type-erased handle.
    pub fn new<T: ValueCipher + 'static>(cipher: T) -> Self {
        Self {
            inner: Arc::new(cipher),
        }
    }

    pub async fn encrypt(&self, plaintext: &str, salt: &str) -> Result<String, CipherError> {
        self.inner.encrypt_boxed(plaintext, salt).await
    }

    pub async fn decrypt(&self, ciphertext: &str, salt: &str) -> Result<String, CipherError> {
        self.inner.decrypt_boxed(ciphertext, salt).await
    }

    pub fn generate_salt(&self) -> String {
        self.inner.generate_salt_dyn()
    }
}

impl std::fmt::Debug for BoxValueCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxValueCipher").finish_non_exhaustive()
    }
}
