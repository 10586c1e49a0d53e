//! Snippet records and their embedding state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use snipsearch_embeddings::Embedding;

use crate::error::{Result, StoreError};

/// Maximum title length, in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// A stored code snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    /// Unique identifier.
    pub id: String,

    /// Short title.
    pub title: String,

    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The code body.
    pub code: String,

    /// Language label, e.g. `rust`.
    pub language: String,

    /// Comma-separated tags.
    #[serde(default)]
    pub tags: String,

    /// When the snippet was created.
    pub created_at: DateTime<Utc>,

    /// When the snippet was last modified.
    pub updated_at: DateTime<Utc>,

    /// Stored embedding for semantic search.
    #[serde(default)]
    pub embedding: EmbeddingState,
}

impl Snippet {
    /// Hash of the fields that feed the semantic-search representation.
    pub fn content_hash(&self) -> String {
        content_hash(&self.title, self.description.as_deref(), &self.code)
    }

    /// The stored vector, if it was computed for the current content.
    pub fn fresh_embedding(&self) -> Option<&Embedding> {
        match &self.embedding {
            EmbeddingState::Present {
                vector,
                content_hash,
                ..
            } if *content_hash == self.content_hash() => Some(vector),
            _ => None,
        }
    }

    /// Whether the embedding must be (re)computed before it can be reused.
    pub fn needs_embedding(&self) -> bool {
        self.fresh_embedding().is_none()
    }
}

/// Embedding lifecycle of a snippet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EmbeddingState {
    /// Never computed, or the provider failed at write time.
    #[default]
    Absent,

    /// Computed for the content identified by `content_hash`.
    #[serde(rename_all = "camelCase")]
    Present {
        vector: Embedding,
        model: String,
        content_hash: String,
    },

    /// The content changed after the vector was computed.
    #[serde(rename_all = "camelCase")]
    Stale {
        vector: Embedding,
        model: String,
        content_hash: String,
    },
}

impl EmbeddingState {
    /// Build a present state for the given snippet content.
    pub fn present(vector: Embedding, model: impl Into<String>, snippet: &Snippet) -> Self {
        Self::Present {
            vector,
            model: model.into(),
            content_hash: snippet.content_hash(),
        }
    }

    /// Downgrade a present vector to stale; other states are unchanged.
    pub fn into_stale(self) -> Self {
        match self {
            Self::Present {
                vector,
                model,
                content_hash,
            } => Self::Stale {
                vector,
                model,
                content_hash,
            },
            other => other,
        }
    }

    /// Short label used in logs and listings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Present { .. } => "present",
            Self::Stale { .. } => "stale",
        }
    }
}

/// Input for creating a snippet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSnippet {
    pub title: String,
    pub description: Option<String>,
    pub code: String,
    pub language: String,
    #[serde(default)]
    pub tags: String,
}

impl NewSnippet {
    /// Create a new snippet input with the required fields.
    pub fn new(
        title: impl Into<String>,
        code: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: None,
            code: code.into(),
            language: language.into(),
            tags: String::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the tags.
    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    pub(crate) fn into_snippet(self) -> Result<Snippet> {
        validate_title(&self.title)?;
        validate_code(&self.code)?;

        let now = Utc::now();
        Ok(Snippet {
            id: Uuid::new_v4().to_string(),
            title: self.title,
            description: normalize_description(self.description),
            code: self.code,
            language: self.language,
            tags: self.tags,
            created_at: now,
            updated_at: now,
            embedding: EmbeddingState::Absent,
        })
    }
}

/// Partial update of a snippet. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnippetUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub language: Option<String>,
    pub tags: Option<String>,
}

impl SnippetUpdate {
    pub(crate) fn apply(self, snippet: &mut Snippet) -> Result<()> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(code) = &self.code {
            validate_code(code)?;
        }

        let before = snippet.content_hash();

        if let Some(title) = self.title {
            snippet.title = title;
        }
        if self.description.is_some() {
            snippet.description = normalize_description(self.description);
        }
        if let Some(code) = self.code {
            snippet.code = code;
        }
        if let Some(language) = self.language {
            snippet.language = language;
        }
        if let Some(tags) = self.tags {
            snippet.tags = tags;
        }

        if snippet.content_hash() != before {
            snippet.embedding = std::mem::take(&mut snippet.embedding).into_stale();
        }
        snippet.updated_at = Utc::now();
        Ok(())
    }
}

/// SHA-256 over the embedded fields, NUL-separated.
pub fn content_hash(title: &str, description: Option<&str>, code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update([0u8]);
    hasher.update(description.unwrap_or_default().as_bytes());
    hasher.update([0u8]);
    hasher.update(code.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn validate_title(title: &str) -> Result<()> {
    let len = title.chars().count();
    if len == 0 || len > MAX_TITLE_CHARS {
        return Err(StoreError::Validation(format!(
            "title must be 1 to {MAX_TITLE_CHARS} characters, got {len}"
        )));
    }
    Ok(())
}

fn validate_code(code: &str) -> Result<()> {
    if code.is_empty() {
        return Err(StoreError::Validation("code must not be empty".to_string()));
    }
    Ok(())
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description.filter(|d| !d.is_empty())
}
