//! Error types for the embeddings system.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Errors that can occur in the embeddings system.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Provider not configured.
    #[error("embedding provider not configured")]
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
    #[error("embedding request timed out after {0:?}")]
    Timeout(Duration),

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl EmbeddingError {
    /// Whether the error came from the upstream provider call rather than
    /// from comparing vectors.
    pub fn is_provider_error(&self) -> bool {
        !matches!(self, Self::DimensionMismatch { .. })
    }

    /// Whether repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Timeout(_) => true,
            Self::Http(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            Self::ApiRequest(_)
            | Self::InvalidResponse(_)
            | Self::ProviderNotConfigured
            | Self::DimensionMismatch { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_is_not_provider_error() {
        let err = EmbeddingError::DimensionMismatch {
            expected: 1536,
            actual: 768,
        };
        assert!(!err.is_provider_error());
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "dimension mismatch: expected 1536, got 768");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(EmbeddingError::RateLimited { retry_after_secs: 1 }.is_retryable());
        assert!(EmbeddingError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(!EmbeddingError::InvalidResponse("bad".to_string()).is_retryable());
        assert!(!EmbeddingError::ProviderNotConfigured.is_retryable());
    }
}
