//! UI-agnostic conversation state types
//!
//! These are shared by the session controller, the API client and the
//! terminal front end, and don't depend on any UI framework.

use serde::{Deserialize, Serialize};

/// Greeting the assistant opens every conversation with
pub const GREETING: &str = "¡Hola! Soy tu Asistente Turístico Pai 🅿️. ¿Cómo puedo ayudarte a planificar tu próximo viaje o aventura? 🌍";

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn avatar(&self) -> &'static str {
        match self {
            ChatRole::User => "🧑‍💻",
            ChatRole::Assistant => "🅿️",
        }
    }
}

/// Messages exchanged so far plus the backend's conversation identifier
#[derive(Debug, Clone)]
pub struct ConversationState {
    pub conversation_id: String,
    pub messages: Vec<ChatMessage>,
}

impl ConversationState {
    /// Fresh state: a client-generated id and the seeded greeting
    pub fn new() -> Self {
        Self {
            conversation_id: uuid::Uuid::new_v4().to_string(),
            messages: vec![ChatMessage::assistant(GREETING)],
        }
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_seeded_with_greeting() {
        let state = ConversationState::new();
        assert_eq!(state.messages, vec![ChatMessage::assistant(GREETING)]);
        assert!(uuid::Uuid::parse_str(&state.conversation_id).is_ok());
    }

    #[test]
    fn test_each_state_gets_its_own_id() {
        let a = ConversationState::new();
        let b = ConversationState::new();
        assert_ne!(a.conversation_id, b.conversation_id);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::user("hola")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hola"}"#);

        let msg: ChatMessage =
            serde_json::from_str(r#"{"role":"assistant","content":"x"}"#).unwrap();
        assert_eq!(msg.role, ChatRole::Assistant);
    }
}
