use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::state::ChatMessage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiRequest {
    pub query: String,
    pub history: Vec<ChatMessage>,
    pub conversation_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

impl ApiResponse {
    /// A reply that carries a failure as plain text
    pub fn from_error(err: &ApiError) -> Self {
        Self {
            response: err.to_string(),
            conversation_id: None,
        }
    }
}

/// Ways a query can fail. Never leaves [`AssistantApi::query`]; the
/// `Display` text is what the user sees in the transcript.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Error: {status} - {body}")]
    Status { status: u16, body: String },
    #[error("Error connecting to the API: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Error connecting to the API: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The remote assistant, as seen by the session.
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Always produces a reply; failures come back as reply text.
    async fn query(&self, request: &ApiRequest) -> ApiResponse;
}

#[derive(Clone)]
pub struct AssistantClient {
    client: Client,
    base_url: String,
}

impl AssistantClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn try_query(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = format!("{}/query", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != reqwest::StatusCode::OK {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let api_response: ApiResponse = serde_json::from_str(&body)?;
        Ok(api_response)
    }
}

#[async_trait]
impl AssistantApi for AssistantClient {
    async fn query(&self, request: &ApiRequest) -> ApiResponse {
        match self.try_query(request).await {
            Ok(response) => {
                debug!(
                    chars = response.response.len(),
                    conversation_id = ?response.conversation_id,
                    "assistant replied"
                );
                response
            }
            Err(err) => {
                warn!(error = %err, base_url = %self.base_url, "assistant query failed");
                ApiResponse::from_error(&err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn request() -> ApiRequest {
        ApiRequest {
            query: "¿Qué ver en Cusco?".to_string(),
            history: vec![
                ChatMessage::assistant("¡Hola!"),
                ChatMessage::user("¿Qué ver en Cusco?"),
            ],
            conversation_id: "conv-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_query_posts_request_and_parses_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/query")
            .match_body(Matcher::Json(json!({
                "query": "¿Qué ver en Cusco?",
                "history": [
                    {"role": "assistant", "content": "¡Hola!"},
                    {"role": "user", "content": "¿Qué ver en Cusco?"}
                ],
                "conversation_id": "conv-1"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"response": "Machu Picchu", "conversation_id": "srv-9"}"#)
            .create_async()
            .await;

        let client = AssistantClient::new(&server.url());
        let reply = client.query(&request()).await;

        assert_eq!(reply.response, "Machu Picchu");
        assert_eq!(reply.conversation_id.as_deref(), Some("srv-9"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_conversation_id_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/query")
            .with_status(200)
            .with_body(r#"{"response": "ok"}"#)
            .create_async()
            .await;

        let reply = AssistantClient::new(&server.url()).query(&request()).await;
        assert_eq!(reply.response, "ok");
        assert_eq!(reply.conversation_id, None);
    }

    #[tokio::test]
    async fn test_error_status_becomes_reply_text() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/query")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let reply = AssistantClient::new(&server.url()).query(&request()).await;
        assert_eq!(reply.response, "Error: 500 - boom");
        assert_eq!(reply.conversation_id, None);
    }

    #[tokio::test]
    async fn test_non_200_success_is_still_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/query")
            .with_status(201)
            .with_body("created")
            .create_async()
            .await;

        let reply = AssistantClient::new(&server.url()).query(&request()).await;
        assert_eq!(reply.response, "Error: 201 - created");
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_soft_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/query")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let reply = AssistantClient::new(&server.url()).query(&request()).await;
        assert!(reply.response.starts_with("Error connecting to the API: "));
        assert_eq!(reply.conversation_id, None);
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_reply_text() {
        // Nothing listens on port 1
        let client = AssistantClient::new("http://127.0.0.1:1");
        let err = client.try_query(&request()).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));

        let reply = client.query(&request()).await;
        let prefix = "Error connecting to the API: ";
        assert!(reply.response.starts_with(prefix));
        assert!(reply.response.len() > prefix.len());
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = AssistantClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
