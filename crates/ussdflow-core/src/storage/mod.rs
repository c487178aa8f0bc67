//! Storage abstractions for ussdflow.
//!
//! The state machine only needs hash-per-key operations (Redis `HGET`/`HSET`
//! semantics). Implementations live in ussdflow-infra.

pub mod box_store;
pub mod hash_store;

pub use box_store::BoxHashStore;
pub use hash_store::{HashStore, HashWrite};
