//! Snippet service: the store, the provider and the ranking engine wired
//! together behind the operations the application exposes.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use snipsearch_embeddings::{Embedding, EmbeddingProvider};
use snipsearch_store::{EmbeddingState, NewSnippet, Snippet, SnippetStore, SnippetUpdate};

use crate::candidate::SearchCandidate;
use crate::config::{EmbeddingStrategy, SearchConfig};
use crate::error::Result;
use crate::ranking::RankingEngine;
use crate::retry::embed_with_policy;

/// A semantic search hit: the full snippet plus its similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticMatch {
    /// The matched snippet.
    #[serde(flatten)]
    pub snippet: Snippet,

    /// Cosine similarity to the query.
    pub similarity: f64,
}

/// Outcome of a [`SnippetService::reindex`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReindexReport {
    /// Snippets that received a fresh embedding.
    pub embedded: usize,

    /// Snippets whose embedding could not be computed.
    pub failed: usize,

    /// Snippets that already had a fresh embedding.
    pub skipped: usize,
}

/// Snippet CRUD plus substring and semantic search.
pub struct SnippetService {
    store: RwLock<SnippetStore>,
    engine: RankingEngine,
    strategy: EmbeddingStrategy,
}

impl SnippetService {
    /// Create a service over an opened store and an explicitly constructed
    /// provider.
    pub fn new(
        store: SnippetStore,
        provider: Arc<dyn EmbeddingProvider>,
        config: SearchConfig,
    ) -> Self {
        Self {
            store: RwLock::new(store),
            engine: RankingEngine::new(provider, config.ranking),
            strategy: config.strategy,
        }
    }

    /// Create a snippet and precompute its embedding.
    ///
    /// A provider failure does not fail the create: the snippet is stored
    /// with an absent embedding and picked up by search or `reindex` later.
    pub async fn create_snippet(&self, input: NewSnippet) -> Result<Snippet> {
        let snippet = self.store.write().await.create(input).await?;
        Ok(self.try_embed(snippet).await)
    }

    /// Apply an update, re-embedding when the searchable content changed.
    pub async fn update_snippet(&self, id: &str, update: SnippetUpdate) -> Result<Snippet> {
        let snippet = self.store.write().await.update(id, update).await?;
        if snippet.needs_embedding() {
            return Ok(self.try_embed(snippet).await);
        }
        Ok(snippet)
    }

    /// Delete a snippet.
    pub async fn delete_snippet(&self, id: &str) -> Result<()> {
        self.store.write().await.delete(id).await?;
        Ok(())
    }

    /// Get a snippet by id.
    pub async fn get_snippet(&self, id: &str) -> Option<Snippet> {
        self.store.read().await.get(id).cloned()
    }

    /// All snippets, newest first.
    pub async fn list_snippets(&self) -> Vec<Snippet> {
        self.store.read().await.list_all()
    }

    /// Substring search over title, description, tags and language.
    pub async fn search_snippets(&self, query: &str) -> Vec<Snippet> {
        self.store.read().await.search(query)
    }

    /// Natural-language search over every stored snippet.
    ///
    /// Returns at most five matches above the similarity threshold, best
    /// first. An empty store is a successful empty result.
    pub async fn semantic_search(&self, query: &str) -> Result<Vec<SemanticMatch>> {
        let snippets = self.store.read().await.list_all();
        let candidates: Vec<SearchCandidate> =
            snippets.iter().map(|s| self.candidate_for(s)).collect();

        let reused = candidates.iter().filter(|c| c.embedding.is_some()).count();
        debug!(
            "Semantic search over {} snippets ({reused} stored embeddings reused)",
            candidates.len()
        );

        let results = self.engine.rank(query, &candidates).await?;

        let mut by_id: HashMap<String, Snippet> =
            snippets.into_iter().map(|s| (s.id.clone(), s)).collect();
        let matches = results
            .into_iter()
            .filter_map(|result| {
                by_id
                    .remove(&result.candidate.id)
                    .map(|snippet| SemanticMatch {
                        snippet,
                        similarity: result.score,
                    })
            })
            .collect();

        Ok(matches)
    }

    /// Compute embeddings for every snippet without a fresh one.
    ///
    /// With `force`, every snippet is re-embedded.
    pub async fn reindex(&self, force: bool) -> Result<ReindexReport> {
        let snippets = self.store.read().await.list_all();
        let mut report = ReindexReport::default();

        for snippet in snippets {
            if !force && self.reusable_embedding(&snippet).is_some() {
                report.skipped += 1;
                continue;
            }
            let embedded = self.try_embed(snippet).await;
            if self.reusable_embedding(&embedded).is_some() {
                report.embedded += 1;
            } else {
                report.failed += 1;
            }
        }

        info!(
            "Reindex finished: {} embedded, {} failed, {} skipped",
            report.embedded, report.failed, report.skipped
        );
        Ok(report)
    }

    fn candidate_for(&self, snippet: &Snippet) -> SearchCandidate {
        let candidate = SearchCandidate::from(snippet);
        match (self.strategy, self.reusable_embedding(snippet)) {
            (EmbeddingStrategy::Stored, Some(vector)) => candidate.with_embedding(vector.clone()),
            _ => candidate,
        }
    }

    /// A stored vector that is fresh, came from the current model and has
    /// the shape the provider currently produces.
    fn reusable_embedding<'a>(&self, snippet: &'a Snippet) -> Option<&'a Embedding> {
        let provider = self.engine.provider();
        match &snippet.embedding {
            EmbeddingState::Present { model, vector, .. }
                if model == provider.model()
                    && provider.dimensions().is_none_or(|dims| vector.len() == dims) =>
            {
                snippet.fresh_embedding()
            }
            _ => None,
        }
    }

    /// Embed a snippet and persist the vector. Failures are logged and leave
    /// the stored state as it was.
    async fn try_embed(&self, snippet: Snippet) -> Snippet {
        let provider = self.engine.provider();
        let text = SearchCandidate::from(&snippet).composite_text();

        let vector =
            match embed_with_policy(provider.as_ref(), &text, self.engine.config()).await {
                Ok(vector) => vector,
                Err(e) => {
                    warn!("Could not embed snippet {}: {e}", snippet.id);
                    return snippet;
                }
            };

        let mut store = self.store.write().await;
        let Some(current) = store.get(&snippet.id) else {
            debug!("Snippet {} was deleted while embedding", snippet.id);
            return snippet;
        };

        // The content changed while the lock was released; the vector no
        // longer describes it.
        if current.content_hash() != snippet.content_hash() {
            debug!("Snippet {} changed while embedding", snippet.id);
            return current.clone();
        }
        let state = EmbeddingState::present(vector, provider.model(), &snippet);

        match store.set_embedding(&snippet.id, state).await {
            Ok(updated) => updated,
            Err(e) => {
                warn!("Could not store embedding for snippet {}: {e}", snippet.id);
                snippet
            }
        }
    }
}
