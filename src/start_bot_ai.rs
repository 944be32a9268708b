//! Startup helpers for the Bot AI server.

use std::process::ExitCode;
use std::sync::Arc;

use crate::chat::core::config::ChatConfig;
use crate::chat::core::errors::ChatResult;
use crate::server::{self, AppState};

/// Run the server until it stops.
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting Bot AI v{}", env!("CARGO_PKG_VERSION"));

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let state = match rt.block_on(initialize(&config)) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to create state: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(server::run_server(state, config.server.port)) {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Read `BOT_AI_*` overrides and validate the result.
///
/// # Errors
/// Returns an error if an override is malformed or a value is out of range.
pub fn load_config() -> ChatResult<ChatConfig> {
    let config = ChatConfig::from_env()?;
    config.validate()?;
    Ok(config)
}

/// Initialize application state without starting the server.
///
/// # Errors
/// Returns an error if state creation fails.
pub async fn initialize(config: &ChatConfig) -> ChatResult<Arc<AppState>> {
    tracing::info!(
        backend = ?config.storage.backend,
        theme = %config.presentation.theme,
        "Initializing chat state"
    );
    AppState::from_config(config).await
}
