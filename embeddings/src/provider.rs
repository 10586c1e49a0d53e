//! Embedding providers.
//!
//! A provider maps one text to one vector. Providers hold no state beyond
//! their client configuration: no caching, no retries, no batching. Retry and
//! timeout policy belong to the caller.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// Default OpenAI embedding model.
pub const DEFAULT_OPENAI_MODEL: &str = "text-embedding-3-small";

/// Default OpenAI API base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Model used to produce vectors. Stored alongside persisted vectors so
    /// a model change can be detected. Must change whenever the output shape
    /// changes.
    fn model(&self) -> &str;

    /// Length of every vector this provider returns, when fixed by its
    /// configuration.
    fn dimensions(&self) -> Option<usize> {
        None
    }

    /// Generate an embedding for the given text.
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Check if the provider is available (API key set, etc.).
    fn is_available(&self) -> bool;
}

/// OpenAI embedding provider.
pub struct OpenAIProvider {
    /// API key.
    api_key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Model to request.
    model: String,

    /// Model plus requested dimensions, as reported by `model()`.
    identity: String,

    /// Output dimensions, if the model supports shortening.
    dimensions: Option<usize>,

    /// Per-request timeout.
    timeout: Duration,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider reading the key from `OPENAI_API_KEY`.
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            client: reqwest::Client::new(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            identity: DEFAULT_OPENAI_MODEL.to_string(),
            dimensions: None,
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
        self.identity = identity(&self.model, self.dimensions);
        self
    }

    /// Request shortened output vectors.
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self.identity = identity(&self.model, self.dimensions);
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn validate(&self, embedding: &[f32]) -> Result<()> {
        if embedding.is_empty() {
            return Err(EmbeddingError::InvalidResponse(
                "empty embedding vector".to_string(),
            ));
        }
        if embedding.iter().any(|x| !x.is_finite()) {
            return Err(EmbeddingError::InvalidResponse(
                "embedding contains non-finite values".to_string(),
            ));
        }
        match self.dimensions {
            Some(expected) if embedding.len() != expected => {
                Err(EmbeddingError::InvalidResponse(format!(
                    "expected {expected} dimensions, got {}",
                    embedding.len()
                )))
            }
            _ => Ok(()),
        }
    }
}

/// `text-embedding-3-small` and `text-embedding-3-small@512` produce vectors
/// of different lengths and must never be mixed.
fn identity(model: &str, dimensions: Option<usize>) -> String {
    match dimensions {
        Some(dims) => format!("{model}@{dims}"),
        None => model.to_string(),
    }
}

impl Default for OpenAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.identity
    }

    fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(EmbeddingError::ProviderNotConfigured)?;

        debug!("Generating embedding with model: {}", self.model);

        let mut body = serde_json::json!({
            "input": text,
            "model": self.model,
        });

        if let Some(dims) = self.dimensions {
            body["dimensions"] = serde_json::json!(dims);
        }

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
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

            return Err(EmbeddingError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiRequest(format!(
                "API error ({status}): {error_text}"
            )));
        }

        let raw = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let result: OpenAIEmbeddingResponse = serde_json::from_slice(&raw)
            .map_err(|e| EmbeddingError::InvalidResponse(format!("malformed body: {e}")))?;

        let embedding = result
            .data
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse("No embedding in response".to_string()))?
            .embedding;

        self.validate(&embedding)?;

        debug!(
            "Generated embedding with {} dimensions (model: {}, tokens: {:?})",
            embedding.len(),
            result.model,
            result.usage.map(|u| u.total_tokens)
        );

        Ok(embedding)
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

impl OpenAIProvider {
    fn map_transport_error(&self, err: reqwest::Error) -> EmbeddingError {
        if err.is_timeout() {
            EmbeddingError::Timeout(self.timeout)
        } else {
            EmbeddingError::Http(err)
        }
    }
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
    model: String,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    total_tokens: u64,
}
