//! AES-256-GCM encryption for collected input values at rest.
//!
//! Every session gets its own key, derived as `HMAC-SHA256(master, salt)`
//! from the session salt. The master key comes from:
//! - A raw 32-byte key
//! - A key file (hex, auto-generated on first use)
//! - A password (Argon2id key derivation)
//!
//! Stored format: `base64(nonce (12 bytes) || ciphertext)`
//!
//! SECURITY: Error values never contain plaintext, ciphertext or key material.

use std::path::Path;

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use ussdflow_core::cipher::ValueCipher;
use ussdflow_types::error::CipherError;

/// Nonce size for AES-256-GCM (96 bits / 12 bytes).
const NONCE_SIZE: usize = 12;

/// Bytes of randomness in a session salt.
const SALT_SIZE: usize = 16;

type HmacSha256 = Hmac<Sha256>;

/// `ValueCipher` backed by AES-256-GCM.
///
/// Each encryption uses a random nonce, so the same value stored twice
/// produces different ciphertexts.
pub struct VaultCipher {
    master: [u8; 32],
}

impl VaultCipher {
    /// Create a cipher from a raw 32-byte master key.
    pub fn new(master: [u8; 32]) -> Self {
        Self { master }
    }

    /// A cipher with a random master key that exists only in this process.
    ///
    /// Anything it encrypts is unreadable after restart.
    pub fn ephemeral() -> Self {
        Self::new(rand_bytes())
    }

    /// Derive the master key from a password using Argon2id.
    ///
    /// OWASP parameters: 19 MiB memory, 2 iterations, 1 lane. The salt is
    /// fixed so the same password always yields the same key; the password
    /// is the only secret.
    pub fn from_password(password: &str) -> Result<Self, CipherError> {
        use argon2::{Algorithm, Argon2, Params, Version};

        let params = Params::new(19456, 2, 1, Some(32))
            .map_err(|_| CipherError::KeyUnavailable("invalid argon2 parameters".to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut master = [0u8; 32];
        argon2
            .hash_password_into(password.as_bytes(), b"ussdflow-vault-v1", &mut master)
            .map_err(|_| CipherError::KeyUnavailable("key derivation failed".to_string()))?;

        Ok(Self::new(master))
    }

    /// Load the master key from `path`, generating and saving one if the file
    /// does not exist.
    ///
    /// The file holds the key as 64 hex characters.
    pub fn from_key_file(path: &Path) -> Result<Self, CipherError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let bytes = hex_decode(contents.trim())
                    .map_err(|_| CipherError::KeyUnavailable("corrupted key file".to_string()))?;
                let master: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| CipherError::KeyUnavailable("invalid key length".to_string()))?;
                Ok(Self::new(master))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let master: [u8; 32] = rand_bytes();
                write_key_file(path, &hex_encode(&master))
                    .map_err(|e| CipherError::KeyUnavailable(e.to_string()))?;
                tracing::info!(path = %path.display(), "generated new vault key");
                Ok(Self::new(master))
            }
            Err(e) => Err(CipherError::KeyUnavailable(e.to_string())),
        }
    }

    fn session_cipher(&self, salt: &str) -> Result<Aes256Gcm, CipherError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.master)
            .map_err(|_| CipherError::KeyUnavailable("invalid master key".to_string()))?;
        mac.update(salt.as_bytes());
        let key = mac.finalize().into_bytes();

        Aes256Gcm::new_from_slice(&key)
            .map_err(|_| CipherError::KeyUnavailable("invalid session key".to_string()))
    }

    fn seal(&self, plaintext: &[u8], salt: &str) -> Result<Vec<u8>, CipherError> {
        let cipher = self.session_cipher(salt)?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| CipherError::EncryptionFailed)?;

        let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        result.extend_from_slice(&nonce);
        result.extend_from_slice(&ciphertext);
        Ok(result)
    }

    fn open(&self, data: &[u8], salt: &str) -> Result<Vec<u8>, CipherError> {
        if data.len() < NONCE_SIZE {
            return Err(CipherError::CiphertextTooShort);
        }

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.session_cipher(salt)?
            .decrypt(nonce, ciphertext)
            .map_err(|_| CipherError::DecryptionFailed)
    }
}

impl ValueCipher for VaultCipher {
    async fn encrypt(&self, plaintext: &str, salt: &str) -> Result<String, CipherError> {
        let sealed = self.seal(plaintext.as_bytes(), salt)?;
        Ok(STANDARD.encode(sealed))
    }

    async fn decrypt(&self, ciphertext: &str, salt: &str) -> Result<String, CipherError> {
        let data = STANDARD
            .decode(ciphertext)
            .map_err(|_| CipherError::InvalidEncoding)?;
        let plaintext = self.open(&data, salt)?;
        String::from_utf8(plaintext).map_err(|_| CipherError::DecryptionFailed)
    }

    fn generate_salt(&self) -> String {
        let salt: [u8; SALT_SIZE] = rand_bytes();
        STANDARD.encode(salt)
    }
}

impl std::fmt::Debug for VaultCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultCipher").finish_non_exhaustive()
    }
}

fn write_key_file(path: &Path, hex_key: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, hex_key)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

/// Fill an array from the OS CSPRNG.
fn rand_bytes<const N: usize>() -> [u8; N] {
    use aes_gcm::aead::rand_core::RngCore;
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(s: &str) -> Result<Vec<u8>, String> {
    if s.len() % 2 != 0 {
        return Err("odd length hex string".to_string());
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            s.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| format!("invalid hex at position {i}"))
        })
        .collect()
}
