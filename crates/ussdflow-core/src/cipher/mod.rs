//! ValueCipher trait for protecting sensitive input values at rest.
//!
//! Defined in ussdflow-core so the collection protocol can encrypt without
//! coupling to a specific algorithm. The AES-256-GCM adapter lives in
//! ussdflow-infra.

pub mod box_cipher;

pub use box_cipher::BoxValueCipher;

use ussdflow_types::error::CipherError;

/// Salted string encryption.
///
/// The salt is per-session and stored alongside the session metadata, so
/// `decrypt(encrypt(v, s), s) == v` must hold for every `v` and `s`.
pub trait ValueCipher: Send + Sync {
    /// Encrypt `plaintext` for the session identified by `salt`.
    fn encrypt(
        &self,
        plaintext: &str,
        salt: &str,
    ) -> impl std::future::Future<Output = Result<String, CipherError>> + Send;

    /// Reverse [`ValueCipher::encrypt`].
    fn decrypt(
        &self,
        ciphertext: &str,
        salt: &str,
    ) -> impl std::future::Future<Output = Result<String, CipherError>> + Send;

    /// Produce a fresh salt for a new session.
    fn generate_salt(&self) -> String;
}
