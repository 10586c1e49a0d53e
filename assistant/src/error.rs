//! Error types for the assistant.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for assistant operations.
pub type Result<T> = std::result::Result<T, AssistantError>;

/// Errors from validating assistant input or calling the chat API.
#[derive(Error, Debug)]
pub enum AssistantError {
    /// No code to analyze.
    #[error("code is empty")]
    EmptyCode,

    /// The description gives too little to work with.
    #[error("description must be at least {min} characters, got {actual}")]
    DescriptionTooShort { min: usize, actual: usize },

    /// Provider not configured.
    #[error("chat provider not configured")]
    ProviderNotConfigured,

    /// API request failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// Invalid response from provider.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// The call did not complete in time.
    #[error("chat request timed out after {0:?}")]
    Timeout(Duration),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl AssistantError {
    /// Whether the input was rejected before any request was made.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::EmptyCode | Self::DescriptionTooShort { .. })
    }
}
