//! Error types for the chat core.

use thiserror::Error;

/// Chat core error type.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Rating outside the accepted `0..=5` range.
    #[error("invalid rating: {0} (expected 0 to 5)")]
    InvalidRating(u8),
    /// The question/answer dataset could not be loaded.
    #[error("dataset error: {0}")]
    Dataset(String),
    /// A value was larger than the store accepts for a single key.
    #[error("quota exceeded for key {key}: {size} bytes (max {max})")]
    QuotaExceeded {
        /// Key being written.
        key: String,
        /// Encoded size of the rejected value.
        size: usize,
        /// Configured per-value ceiling.
        max: usize,
    },
    /// `SQLite` storage error (sync).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// `SQLite` storage error (async).
    #[error("tokio-rusqlite error: {0}")]
    TokioSqlite(#[from] tokio_rusqlite::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result alias for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;
