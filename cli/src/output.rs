//! JSON views printed on stdout.
//!
//! Embedding vectors are reduced to their status; they are noise on a
//! terminal.

use chrono::{DateTime, Utc};
use serde::Serialize;

use snipsearch_search::SemanticMatch;
use snipsearch_store::Snippet;

/// A snippet as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetView {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub code: String,
    pub language: String,
    pub tags: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub embedding: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

impl From<Snippet> for SnippetView {
    fn from(snippet: Snippet) -> Self {
        Self {
            embedding: snippet.embedding.label(),
            id: snippet.id,
            title: snippet.title,
            description: snippet.description,
            code: snippet.code,
            language: snippet.language,
            tags: snippet.tags,
            created_at: snippet.created_at,
            updated_at: snippet.updated_at,
            similarity: None,
        }
    }
}

impl From<SemanticMatch> for SnippetView {
    fn from(found: SemanticMatch) -> Self {
        Self {
            similarity: Some(found.similarity),
            ..Self::from(found.snippet)
        }
    }
}

/// Convert a list of snippets or matches to views.
pub fn views<T: Into<SnippetView>>(items: Vec<T>) -> Vec<SnippetView> {
    items.into_iter().map(Into::into).collect()
}

/// Print a value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use snipsearch_store::EmbeddingState;

    fn snippet() -> Snippet {
        let now = Utc::now();
        let mut snippet = Snippet {
            id: "abc".to_string(),
            title: "Debounce".to_string(),
            description: None,
            code: "function debounce() {}".to_string(),
            language: "typescript".to_string(),
            tags: "ui".to_string(),
            created_at: now,
            updated_at: now,
            embedding: EmbeddingState::Absent,
        };
        snippet.embedding = EmbeddingState::present(vec![0.25; 4], "m", &snippet);
        snippet
    }

    #[test]
    fn test_view_hides_vector() {
        let json = serde_json::to_value(SnippetView::from(snippet())).unwrap();

        assert_eq!(json["embedding"], "present");
        assert_eq!(json["createdAt"], json["updatedAt"]);
        assert!(json.get("description").is_none());
        assert!(json.get("similarity").is_none());
    }

    #[test]
    fn test_match_view_carries_similarity() {
        let view = SnippetView::from(SemanticMatch {
            snippet: snippet(),
            similarity: 0.91,
        });

        assert_eq!(view.similarity, Some(0.91));
        assert_eq!(view.id, "abc");
        assert_eq!(view.embedding, "present");
    }
}
