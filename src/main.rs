//! Binary entrypoint that launches the Bot AI server.

use std::process::ExitCode;

use bot_ai::start_bot_ai;

/// Load config, open the history store and serve the chat API.
fn main() -> ExitCode {
    start_bot_ai::run()
}
