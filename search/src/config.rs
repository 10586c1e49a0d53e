//! Configuration for semantic search.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Minimum similarity a candidate must exceed to be returned.
pub const SIMILARITY_THRESHOLD: f64 = 0.70;

/// Maximum number of results returned by one search.
pub const MAX_RESULTS: usize = 5;

/// Configuration for the snippet service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Where candidate vectors come from.
    pub strategy: EmbeddingStrategy,

    /// Ranking engine settings.
    pub ranking: RankingConfig,
}

impl SearchConfig {
    /// Set the embedding strategy.
    pub fn with_strategy(mut self, strategy: EmbeddingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the ranking configuration.
    pub fn with_ranking(mut self, ranking: RankingConfig) -> Self {
        self.ranking = ranking;
        self
    }
}

/// Where candidate vectors come from on each search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingStrategy {
    /// Reuse vectors stored at write time; embed only absent or stale ones.
    #[default]
    Stored,
    /// Embed every candidate on every search.
    PerSearch,
}

/// What to do when a single candidate cannot be embedded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateFailurePolicy {
    /// Fail the whole search.
    #[default]
    FailFast,
    /// Log the failure and leave the candidate out.
    BestEffort,
}

/// Configuration for the ranking engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Maximum embedding calls in flight per search.
    pub max_concurrency: usize,

    /// Timeout for one embedding call, in milliseconds.
    pub request_timeout_ms: u64,

    /// Retries after the first attempt, for retryable provider errors.
    pub max_retries: usize,

    /// First backoff delay, in milliseconds.
    pub retry_initial_delay_ms: u64,

    /// Upper bound on a backoff delay, in milliseconds.
    pub retry_max_delay_ms: u64,

    /// Handling of per-candidate embedding failures.
    pub candidate_failure: CandidateFailurePolicy,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            request_timeout_ms: 30_000,
            max_retries: 2,
            retry_initial_delay_ms: 200,
            retry_max_delay_ms: 5_000,
            candidate_failure: CandidateFailurePolicy::FailFast,
        }
    }
}

impl RankingConfig {
    /// Set the concurrency bound.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Set the per-call timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the retry budget.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the candidate failure policy.
    pub fn with_candidate_failure(mut self, policy: CandidateFailurePolicy) -> Self {
        self.candidate_failure = policy;
        self
    }

    /// Per-call timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Effective concurrency bound, never zero.
    pub fn concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }
}
