//! Table-driven reply generation.

pub mod dataset;
pub mod responder;

pub use dataset::{QaPair, embedded_dataset, load_dataset, parse_dataset};
pub use responder::{Matcher, Responder, ResponseFuture};
