//! Cryptographic operations.
//!
//! - `vault`: AES-256-GCM value cipher with per-session keys

pub mod vault;

pub use vault::VaultCipher;
