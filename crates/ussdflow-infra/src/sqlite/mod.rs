//! SQLite storage layer.
//!
//! Hash store backed by SQLite with WAL mode and split read/write
//! connection pools.

pub mod hash_store;
pub mod pool;

pub use hash_store::SqliteHashStore;
pub use pool::DatabasePool;
