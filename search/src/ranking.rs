//! Semantic ranking engine.
//!
//! Embeds the query and every candidate, scores each pair by cosine
//! similarity, drops pairs at or below [`SIMILARITY_THRESHOLD`], and returns
//! at most [`MAX_RESULTS`] in descending order. Equal scores keep input order.

use std::cmp::Reverse;
use std::sync::Arc;

use ordered_float::OrderedFloat;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use snipsearch_embeddings::{Embedding, EmbeddingError, EmbeddingProvider, cosine_similarity};

use crate::candidate::{ScoredResult, SearchCandidate};
use crate::config::{CandidateFailurePolicy, MAX_RESULTS, RankingConfig, SIMILARITY_THRESHOLD};
use crate::error::{EmbeddingTarget, Result, SearchError};
use crate::retry::embed_with_policy;

/// Ranks candidates against a natural-language query.
///
/// The engine holds no per-search state and can serve concurrent searches.
/// Dropping a [`rank`](Self::rank) future aborts its in-flight embedding
/// calls.
pub struct RankingEngine {
    provider: Arc<dyn EmbeddingProvider>,
    config: Arc<RankingConfig>,
}

impl RankingEngine {
    /// Create an engine over the given provider.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: RankingConfig) -> Self {
        Self {
            provider,
            config: Arc::new(config),
        }
    }

    /// The provider used for embeddings.
    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// The engine configuration.
    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Rank `candidates` by similarity to `query`.
    ///
    /// Fails with [`SearchError::EmptyQuery`] before any provider call when
    /// the trimmed query is empty. An empty candidate set yields an empty
    /// result without embedding the query.
    pub async fn rank(
        &self,
        query: &str,
        candidates: &[SearchCandidate],
    ) -> Result<Vec<ScoredResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        if candidates.is_empty() {
            debug!("No candidates to rank");
            return Ok(Vec::new());
        }

        debug!(
            "Ranking {} candidates with provider {}",
            candidates.len(),
            self.provider.name()
        );

        let (query_vector, candidate_vectors) =
            tokio::try_join!(self.embed_query(query), self.embed_candidates(candidates))?;

        let mut results = Vec::new();
        for (candidate, vector) in candidates.iter().zip(candidate_vectors) {
            let Some(vector) = vector else {
                continue;
            };
            let score = score_pair(&query_vector, &vector, &candidate.id)?;
            if score > SIMILARITY_THRESHOLD {
                results.push(ScoredResult {
                    candidate: candidate.clone(),
                    score,
                });
            }
        }

        // Stable: equal scores keep input order.
        results.sort_by_key(|r| Reverse(OrderedFloat(r.score)));
        results.truncate(MAX_RESULTS);

        info!(
            "Semantic search matched {} of {} candidates",
            results.len(),
            candidates.len()
        );
        Ok(results)
    }

    async fn embed_query(&self, query: &str) -> Result<Embedding> {
        embed_with_policy(self.provider.as_ref(), query, &self.config)
            .await
            .map_err(|e| SearchError::provider(EmbeddingTarget::Query, e))
    }

    /// One vector per candidate, by position. `None` marks a candidate left
    /// out under the best-effort policy.
    async fn embed_candidates(
        &self,
        candidates: &[SearchCandidate],
    ) -> Result<Vec<Option<Embedding>>> {
        let mut vectors: Vec<Option<Embedding>> = vec![None; candidates.len()];
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency()));
        let mut tasks = JoinSet::new();

        for (index, candidate) in candidates.iter().enumerate() {
            if let Some(vector) = &candidate.embedding {
                vectors[index] = Some(vector.clone());
                continue;
            }

            let provider = Arc::clone(&self.provider);
            let config = Arc::clone(&self.config);
            let semaphore = Arc::clone(&semaphore);
            let text = candidate.composite_text();

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (
                        index,
                        Err(EmbeddingError::ApiRequest(
                            "embedding pool closed".to_string(),
                        )),
                    );
                };
                (
                    index,
                    embed_with_policy(provider.as_ref(), &text, &config).await,
                )
            });
        }

        let mut skipped = 0usize;
        while let Some(joined) = tasks.join_next().await {
            let (index, result) = joined.map_err(|e| SearchError::Task(e.to_string()))?;
            let id = &candidates[index].id;
            match result {
                Ok(vector) => vectors[index] = Some(vector),
                Err(e) => match self.config.candidate_failure {
                    // Returning drops `tasks`, which aborts the remaining calls.
                    CandidateFailurePolicy::FailFast => {
                        return Err(SearchError::provider(
                            EmbeddingTarget::Candidate(id.clone()),
                            e,
                        ));
                    }
                    CandidateFailurePolicy::BestEffort => {
                        warn!("Excluding candidate {id} from search: {e}");
                        skipped += 1;
                    }
                },
            }
        }

        if skipped > 0 {
            warn!("{skipped} candidates could not be embedded and were excluded");
        }

        Ok(vectors)
    }
}

fn score_pair(query: &[f32], candidate: &[f32], candidate_id: &str) -> Result<f64> {
    cosine_similarity(query, candidate).map_err(|e| match e {
        EmbeddingError::DimensionMismatch { expected, actual } => SearchError::DimensionMismatch {
            candidate_id: candidate_id.to_string(),
            expected,
            actual,
        },
        other => SearchError::provider(EmbeddingTarget::Candidate(candidate_id.to_string()), other),
    })
}
