//! Search candidates and scored results.

use serde::{Deserialize, Serialize};

use snipsearch_embeddings::Embedding;
use snipsearch_store::Snippet;

/// A record eligible to be matched against a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCandidate {
    /// Identifier, echoed unchanged in results.
    pub id: String,

    /// Title.
    pub title: String,

    /// Optional description.
    pub description: Option<String>,

    /// Code body.
    pub code: String,

    /// Precomputed vector for the current content, if one may be reused.
    #[serde(skip)]
    pub embedding: Option<Embedding>,
}

impl SearchCandidate {
    /// Create a candidate without a description.
    pub fn new(id: impl Into<String>, title: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            code: code.into(),
            embedding: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a precomputed vector.
    pub fn with_embedding(mut self, embedding: Embedding) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Text that gets embedded: title, description and code, space-separated.
    pub fn composite_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title,
            self.description.as_deref().unwrap_or_default(),
            self.code
        )
    }
}

impl From<&Snippet> for SearchCandidate {
    fn from(snippet: &Snippet) -> Self {
        Self {
            id: snippet.id.clone(),
            title: snippet.title.clone(),
            description: snippet.description.clone(),
            code: snippet.code.clone(),
            embedding: None,
        }
    }
}

/// A candidate paired with its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    /// The matched candidate.
    #[serde(flatten)]
    pub candidate: SearchCandidate,

    /// Cosine similarity to the query.
    #[serde(rename = "similarity")]
    pub score: f64,
}
