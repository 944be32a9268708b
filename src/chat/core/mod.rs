//! Core chat types and identifiers.

pub mod config;
pub mod errors;
pub mod ids;
pub mod message;
pub mod session;
pub mod theme;

pub use config::{
    ChatConfig, DEFAULT_FALLBACK_RESPONSE, DEFAULT_PORT, MatcherConfig, PresentationConfig,
    ServerConfig, StorageBackend, StorageConfig,
};
pub use errors::{ChatError, ChatResult};
pub use ids::SessionId;
pub use message::{Message, Sender, time_label};
pub use session::{Rating, Session, TODAY_LABEL, date_label};
pub use theme::Theme;
