//! Chat session controller
//!
//! Owns the conversation for the lifetime of the app and runs one turn at a
//! time. A turn can be driven in one call with
//! [`ChatSession::submit_user_message`], or split into
//! [`ChatSession::begin_turn`] / [`ChatSession::complete_turn`] when the
//! caller runs the request itself (the terminal UI does, so it can keep
//! drawing while the request is in flight).

use tracing::info;

use crate::api::{ApiRequest, ApiResponse, AssistantApi};
use crate::state::{ChatMessage, ChatRole, ConversationState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    AwaitingInput,
    AwaitingApiResponse,
}

/// One entry of the rendered transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRecord {
    pub role: ChatRole,
    pub avatar: &'static str,
    pub content: String,
}

pub struct ChatSession<A: AssistantApi> {
    client: A,
    state: ConversationState,
    phase: TurnPhase,
}

impl<A: AssistantApi> ChatSession<A> {
    /// Start a session: fresh conversation id, greeting already in place
    pub fn new(client: A) -> Self {
        Self {
            client,
            state: ConversationState::new(),
            phase: TurnPhase::AwaitingInput,
        }
    }

    pub fn client(&self) -> &A {
        &self.client
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.state.messages
    }

    pub fn message_count(&self) -> usize {
        self.state.messages.len()
    }

    pub fn conversation_id(&self) -> &str {
        &self.state.conversation_id
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Run a whole turn. Blank input is ignored and returns `None`;
    /// otherwise returns the assistant message that was appended.
    pub async fn submit_user_message(&mut self, text: &str) -> Option<&ChatMessage> {
        let request = self.begin_turn(text)?;
        let response = self.client.query(&request).await;
        Some(self.complete_turn(response))
    }

    /// Append the user message and build the request for it. Returns `None`
    /// for blank input or while another turn is still waiting on the API.
    pub fn begin_turn(&mut self, text: &str) -> Option<ApiRequest> {
        if text.trim().is_empty() || self.phase == TurnPhase::AwaitingApiResponse {
            return None;
        }

        self.state.messages.push(ChatMessage::user(text));
        self.phase = TurnPhase::AwaitingApiResponse;

        info!(
            conversation_id = %self.state.conversation_id,
            history = self.state.messages.len(),
            "turn started"
        );

        Some(ApiRequest {
            query: text.to_string(),
            history: self.state.messages.clone(),
            conversation_id: self.state.conversation_id.clone(),
        })
    }

    /// Record the reply for the turn in flight.
    pub fn complete_turn(&mut self, response: ApiResponse) -> &ChatMessage {
        let ApiResponse {
            response,
            conversation_id,
        } = response;

        if let Some(id) = conversation_id.filter(|id| !id.is_empty()) {
            if id != self.state.conversation_id {
                info!(from = %self.state.conversation_id, to = %id, "conversation id replaced");
            }
            self.state.conversation_id = id;
        }

        self.state.messages.push(ChatMessage::assistant(response));
        self.phase = TurnPhase::AwaitingInput;

        info!(history = self.state.messages.len(), "turn finished");

        &self.state.messages[self.state.messages.len() - 1]
    }

    pub fn render_history(&self) -> Vec<DisplayRecord> {
        self.state
            .messages
            .iter()
            .map(|msg| DisplayRecord {
                role: msg.role,
                avatar: msg.role.avatar(),
                content: msg.content.clone(),
            })
            .collect()
    }
}
