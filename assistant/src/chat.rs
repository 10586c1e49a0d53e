//! Chat-completion providers.
//!
//! A provider turns one request (a system prompt, a user message and the
//! sampling settings) into the text of the first choice. No retries.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AssistantError, Result};

/// Default chat model.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";

/// Default OpenAI API base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One message of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Trait for chat-completion providers.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Model answering the requests.
    fn model(&self) -> &str;

    /// Return the text of the first completion choice.
    async fn complete(&self, request: &ChatRequest) -> Result<String>;

    /// Check if the provider is available (API key set, etc.).
    fn is_available(&self) -> bool;
}

/// OpenAI `/chat/completions` client.
pub struct OpenAIChatClient {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
    model: String,
    timeout: Duration,
}

impl OpenAIChatClient {
    /// Create a client reading the key from `OPENAI_API_KEY`.
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            client: reqwest::Client::new(),
            model: DEFAULT_CHAT_MODEL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn map_transport_error(&self, err: reqwest::Error) -> AssistantError {
        if err.is_timeout() {
            AssistantError::Timeout(self.timeout)
        } else {
            AssistantError::Http(err)
        }
    }
}

impl Default for OpenAIChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatProvider for OpenAIChatClient {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(AssistantError::ProviderNotConfigured)?;

        debug!("Requesting chat completion with model: {}", self.model);

        let body = CompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(AssistantError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AssistantError::ApiRequest(format!(
                "API error ({status}): {error_text}"
            )));
        }

        let raw = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let result: CompletionResponse = serde_json::from_slice(&raw)
            .map_err(|e| AssistantError::InvalidResponse(format!("malformed body: {e}")))?;

        let content = result
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                AssistantError::InvalidResponse("No completion in response".to_string())
            })?;

        debug!(
            "Chat completion returned {} chars (tokens: {:?})",
            content.len(),
            result.usage.map(|u| u.total_tokens)
        );

        Ok(content)
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
    usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    total_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenAIChatClient {
        OpenAIChatClient::new()
            .with_api_key("test-key")
            .with_base_url(server.uri())
    }

    fn completion_body(content: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 20, "completion_tokens": 10, "total_tokens": 30 }
        })
    }

    fn request() -> ChatRequest {
        ChatRequest {
            messages: vec![
                ChatMessage::system("You review code."),
                ChatMessage::user("fn main() {}"),
            ],
            temperature: 0.25,
            max_tokens: 300,
        }
    }

    #[tokio::test]
    async fn test_complete_sends_messages_and_settings() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(bearer_token("test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [
                    { "role": "system", "content": "You review code." },
                    { "role": "user", "content": "fn main() {}" }
                ],
                "temperature": 0.25,
                "max_tokens": 300
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body(serde_json::json!("An empty entry point."))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server).complete(&request()).await.unwrap();
        assert_eq!(text, "An empty entry point.");
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = OpenAIChatClient {
            api_key: None,
            ..client_for(&server)
        };
        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(err, AssistantError::ProviderNotConfigured));
        assert!(!client.is_available());
    }

    #[tokio::test]
    async fn test_null_content_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion_body(serde_json::Value::Null)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).complete(&request()).await.unwrap_err();
        assert!(matches!(err, AssistantError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_rate_limit_and_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "3"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            AssistantError::RateLimited { retry_after_secs: 3 }
        ));

        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(err, AssistantError::ApiRequest(ref msg) if msg.contains("overloaded")));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body(serde_json::json!("late")))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .with_timeout(Duration::from_millis(50))
            .complete(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::Timeout(_)));
    }
}
