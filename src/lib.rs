//! Canned-response chat core with persistent, rateable conversation history.

// Forbid unsafe or non-idiomatic practices
#![deny(unsafe_code)] // No unsafe code
#![deny(missing_docs)] // Every public item is documented
#![deny(non_camel_case_types)]
#![deny(unused_must_use)] // Results and Options are handled explicitly
#![deny(non_snake_case)]
#![deny(non_upper_case_globals)]
#![deny(nonstandard_style)]
#![forbid(unsafe_op_in_unsafe_fn)]

// Clippy discipline
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::unwrap_used)] // No unwrap() outside tests
#![deny(clippy::expect_used)] // No expect() outside tests
#![deny(clippy::panic)]
#![deny(clippy::print_stdout)] // Logging goes through tracing
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::unwrap_in_result)]
#![deny(clippy::redundant_clone)]
#![deny(clippy::too_many_arguments)]
#![deny(clippy::cognitive_complexity)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

// Robustness
#![deny(overflowing_literals)]

/// Chat engine: matcher, sessions, history and storage.
pub mod chat;
/// HTTP server and API routes.
#[allow(clippy::missing_errors_doc, clippy::unused_async)]
pub mod server;
/// Entry helpers to start the Bot AI server.
pub mod start_bot_ai;
