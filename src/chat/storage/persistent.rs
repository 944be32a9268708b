//! Typed, fail-soft access to the key-value store.
//!
//! Nothing here returns an error: a broken or full store degrades to
//! in-memory behaviour and the failure is only logged.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::chat::storage::kv_store::KeyValueStore;

/// JSON encode/decode wrapper around a [`KeyValueStore`].
#[derive(Clone)]
pub struct PersistentState {
    store: Arc<dyn KeyValueStore>,
}

impl PersistentState {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load and decode the value under `key`, or return `default`.
    ///
    /// `default` is used when the key is absent, the store fails, or the
    /// stored text does not decode as `T`.
    pub async fn load<T>(&self, key: &str, default: T) -> T
    where
        T: DeserializeOwned + Send,
    {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(err) => {
                warn!(key, error = %err, "Failed to read from store, using default");
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key, bytes = raw.len(), "Loaded value from store");
                value
            }
            Err(err) => {
                warn!(key, error = %err, "Stored value is not decodable, using default");
                default
            }
        }
    }

    /// Encode `value` and overwrite `key` with it.
    ///
    /// Encoding and write failures are logged and swallowed; the previously
    /// stored value is left as it was.
    pub async fn save<T>(&self, key: &str, value: &T)
    where
        T: Serialize + ?Sized + Sync,
    {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key, error = %err, "Failed to encode value for store");
                return;
            }
        };

        let bytes = raw.len();
        match self.store.set(key, raw).await {
            Ok(()) => debug!(key, bytes, "Saved value to store"),
            Err(err) => warn!(key, error = %err, "Failed to write to store"),
        }
    }
}
