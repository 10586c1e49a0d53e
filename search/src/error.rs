//! Error types for semantic search.

use std::fmt;

use thiserror::Error;

use snipsearch_embeddings::EmbeddingError;
use snipsearch_store::StoreError;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Which text an embedding was requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddingTarget {
    /// The search query.
    Query,
    /// A candidate, by id.
    Candidate(String),
}

impl fmt::Display for EmbeddingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => f.write_str("query"),
            Self::Candidate(id) => write!(f, "candidate {id}"),
        }
    }
}

/// Errors that can occur during search.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The query was empty after trimming. No provider call was made.
    #[error("search query is empty")]
    EmptyQuery,

    /// The embedding provider failed or returned malformed output.
    #[error("embedding provider failed for {target}: {source}")]
    Provider {
        target: EmbeddingTarget,
        #[source]
        source: EmbeddingError,
    },

    /// Query and candidate vectors have different lengths.
    #[error(
        "dimension mismatch for candidate {candidate_id}: query has {expected} dimensions, candidate has {actual}"
    )]
    DimensionMismatch {
        candidate_id: String,
        expected: usize,
        actual: usize,
    },

    /// Snippet store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// An embedding task panicked or was cancelled.
    #[error("embedding task failed: {0}")]
    Task(String),
}

impl SearchError {
    pub(crate) fn provider(target: EmbeddingTarget, source: EmbeddingError) -> Self {
        Self::Provider { target, source }
    }
}
