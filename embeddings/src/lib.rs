//! # Embeddings
//!
//! Text-to-vector providers and similarity primitives for snippet search.
//!
//! ## Features
//!
//! - **Embedding Generation**: Convert text to dense vectors through an
//!   [`EmbeddingProvider`]
//! - **OpenAI Adapter**: `/embeddings` client with response validation
//! - **Offline Provider**: feature hashing for use without an API key
//! - **Similarity**: cosine similarity with explicit dimension checks
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Embeddings System                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  EmbeddingProvider ──► Embedding ──► cosine_similarity          │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  OpenAI / Hashing                                               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod hashing;
pub mod provider;
pub mod similarity;

pub use error::{EmbeddingError, Result};
pub use hashing::HashingProvider;
pub use provider::{EmbeddingProvider, OpenAIProvider};
pub use similarity::cosine_similarity;

/// A dense vector embedding.
pub type Embedding = Vec<f32>;
