//! # Semantic Search
//!
//! Ranks stored code snippets against a natural-language query by embedding
//! similarity, and exposes the snippet operations the CLI drives.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       SnippetService                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  SnippetStore ──► SearchCandidate ──► RankingEngine             │
//! │                                          │                      │
//! │                       query + candidates │ bounded fan-out      │
//! │                                          ▼                      │
//! │                                 EmbeddingProvider               │
//! │                                          │                      │
//! │                   cosine > 0.70, best first, at most 5          │
//! │                                          ▼                      │
//! │                                   SemanticMatch                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use snipsearch_embeddings::OpenAIProvider;
//! use snipsearch_search::{SearchConfig, SnippetService};
//! use snipsearch_store::SnippetStore;
//!
//! let store = SnippetStore::open("~/.local/share/snipsearch").await?;
//! let provider = Arc::new(OpenAIProvider::new());
//! let service = SnippetService::new(store, provider, SearchConfig::default());
//!
//! let matches = service.semantic_search("debounce a callback").await?;
//! ```

pub mod candidate;
pub mod config;
pub mod error;
pub mod ranking;
pub mod retry;
pub mod service;

pub use candidate::{ScoredResult, SearchCandidate};
pub use config::{
    CandidateFailurePolicy, EmbeddingStrategy, MAX_RESULTS, RankingConfig, SIMILARITY_THRESHOLD,
    SearchConfig,
};
pub use error::{EmbeddingTarget, Result, SearchError};
pub use ranking::RankingEngine;
pub use service::{ReindexReport, SemanticMatch, SnippetService};
