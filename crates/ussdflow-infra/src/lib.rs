//! Infrastructure layer for ussdflow.
//!
//! Implements the ports defined in `ussdflow-core`: SQLite and in-memory
//! hash stores, and the AES-256-GCM value cipher. Also loads configuration
//! from the data directory.

pub mod config;
pub mod crypto;
pub mod memory;
pub mod sqlite;
