//! Question/answer dataset backing the matcher.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chat::core::errors::{ChatError, ChatResult};

/// Sample data compiled into the binary.
const EMBEDDED_DATASET: &str = include_str!("../../../data/sample_data.json");

/// One trigger phrase and its canned reply.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct QaPair {
    /// Phrase searched for in the user's text.
    pub question: String,
    /// Reply returned on a match.
    pub response: String,
}

impl QaPair {
    /// Build a pair.
    #[must_use]
    pub fn new(question: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            response: response.into(),
        }
    }
}

/// Parse a dataset from JSON text.
///
/// # Errors
/// Returns `ChatError::Dataset` if the text is not a JSON array of pairs.
pub fn parse_dataset(json: &str) -> ChatResult<Vec<QaPair>> {
    serde_json::from_str(json).map_err(|err| ChatError::Dataset(err.to_string()))
}

/// The embedded sample dataset.
///
/// # Errors
/// Returns an error if the embedded file is malformed.
pub fn embedded_dataset() -> ChatResult<Vec<QaPair>> {
    parse_dataset(EMBEDDED_DATASET)
}

/// Load the dataset from `path`, or the embedded one when `path` is `None`.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_dataset(path: Option<&Path>) -> ChatResult<Vec<QaPair>> {
    let pairs = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            parse_dataset(&raw)
                .map_err(|err| ChatError::Dataset(format!("{}: {err}", path.display())))?
        }
        None => embedded_dataset()?,
    };

    info!(entries = pairs.len(), "Loaded question dataset");
    Ok(pairs)
}
