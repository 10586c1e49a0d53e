//! Error types for the snippet store.

use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in the snippet store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Snippet not found.
    #[error("snippet not found: {0}")]
    NotFound(String),

    /// Input rejected before it reached disk.
    #[error("invalid snippet: {0}")]
    Validation(String),

    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to create storage directory.
    #[error("failed to create directory: {0}")]
    CreateDirectory(String),

    /// Failed to read snippet file.
    #[error("failed to read file: {0}")]
    ReadFile(String),

    /// Failed to write snippet file.
    #[error("failed to write file: {0}")]
    WriteFile(String),

    /// Failed to delete snippet file.
    #[error("failed to delete file: {0}")]
    DeleteFile(String),
}
