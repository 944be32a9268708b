//! Canned-response lookup.

use std::future::Future;
use std::pin::Pin;

use tracing::{debug, warn};

use crate::chat::core::config::DEFAULT_FALLBACK_RESPONSE;
use crate::chat::matcher::dataset::QaPair;

/// Boxed future type for responder operations.
pub type ResponseFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Anything that can answer a user's text.
///
/// The trait is asynchronous so a real backend can slot in later; the
/// table-driven [`Matcher`] resolves immediately.
pub trait Responder: Send + Sync {
    /// Produce a reply for `text`. Must not fail.
    fn respond<'a>(&'a self, text: &'a str) -> ResponseFuture<'a, String>;
}

/// Case-insensitive substring matcher over an ordered trigger table.
#[derive(Clone, Debug)]
pub struct Matcher {
    /// Lower-cased trigger and its reply, in table order.
    entries: Vec<(String, String)>,
    fallback: String,
}

impl Matcher {
    /// Build a matcher using the default fallback reply.
    #[must_use]
    pub fn new(pairs: Vec<QaPair>) -> Self {
        Self::with_fallback(pairs, DEFAULT_FALLBACK_RESPONSE)
    }

    /// Build a matcher with a custom fallback reply.
    ///
    /// Blank triggers are dropped, since an empty phrase would match every input.
    #[must_use]
    pub fn with_fallback(pairs: Vec<QaPair>, fallback: impl Into<String>) -> Self {
        let total = pairs.len();
        let entries: Vec<(String, String)> = pairs
            .into_iter()
            .filter(|pair| !pair.question.trim().is_empty())
            .map(|pair| (pair.question.to_lowercase(), pair.response))
            .collect();

        if entries.len() < total {
            warn!(
                dropped = total - entries.len(),
                "Ignoring dataset entries with blank questions"
            );
        }

        Self {
            entries,
            fallback: fallback.into(),
        }
    }

    /// Return the reply for `text`: the first trigger contained in it, or the fallback.
    #[must_use]
    pub fn lookup(&self, text: &str) -> &str {
        let lowered = text.to_lowercase();
        self.entries
            .iter()
            .find(|(trigger, _)| lowered.contains(trigger.as_str()))
            .map_or(self.fallback.as_str(), |(_, response)| response.as_str())
    }

    /// Number of usable triggers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no usable triggers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Responder for Matcher {
    fn respond<'a>(&'a self, text: &'a str) -> ResponseFuture<'a, String> {
        let reply = self.lookup(text).to_string();
        debug!(matched = reply != self.fallback, "Matcher reply ready");
        Box::pin(std::future::ready(reply))
    }
}
