//! Persistent storage for chat data.

pub mod kv_store;
pub mod persistent;

pub use kv_store::{InMemoryKvStore, KeyValueStore, SqliteKvStore, StoreFuture};
pub use persistent::PersistentState;
