//! # Snippet Store
//!
//! Persistent storage for code snippets: one JSON file per snippet, an
//! in-memory mirror, substring search, and the embedding state that lets
//! semantic search reuse vectors computed at write time.

pub mod error;
pub mod snippet;
pub mod storage;

pub use error::{Result, StorageError, StoreError};
pub use snippet::{EmbeddingState, NewSnippet, Snippet, SnippetUpdate};
pub use storage::SnippetStore;
