//! Application state shared across all request handlers.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::chat::controller::ChatController;
use crate::chat::core::config::ChatConfig;
use crate::chat::core::errors::ChatResult;
use crate::chat::core::theme::Theme;

/// Shared application state.
pub struct AppState {
    /// The single conversation served by this process.
    pub chat: Mutex<ChatController>,
    /// Presentation theme. Never persisted.
    pub theme: RwLock<Theme>,
}

impl AppState {
    /// Wrap an existing controller.
    #[must_use]
    pub fn new(controller: ChatController, theme: Theme) -> Arc<Self> {
        Arc::new(Self {
            chat: Mutex::new(controller),
            theme: RwLock::new(theme),
        })
    }

    /// Build the controller and its backends from config.
    ///
    /// # Errors
    /// Returns an error if the configuration or dataset is invalid.
    pub async fn from_config(config: &ChatConfig) -> ChatResult<Arc<Self>> {
        let controller = ChatController::from_config(config).await?;
        Ok(Self::new(controller, config.presentation.theme))
    }
}
