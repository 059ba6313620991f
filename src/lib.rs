pub mod api;
pub mod app;
pub mod assets;
pub mod config;
pub mod handler;
pub mod logging;
pub mod reveal;
pub mod session;
pub mod state;
pub mod tui;
pub mod ui;

// Re-export main types for convenience
pub use api::{ApiRequest, ApiResponse, AssistantApi, AssistantClient};
pub use config::Config;
pub use reveal::{Reveal, reveal_frames};
pub use session::{ChatSession, DisplayRecord, TurnPhase};
pub use state::{ChatMessage, ChatRole, ConversationState};
