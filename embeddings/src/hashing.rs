//! Offline feature-hashing provider.
//!
//! Maps each lowercase word of the input onto one of `dimension` buckets with
//! a signed weight derived from its SHA-256 digest. Texts sharing vocabulary
//! land close under cosine similarity. No network, no model files; useful for
//! local use without an API key and for deterministic tests.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::Embedding;
use crate::error::Result;
use crate::provider::EmbeddingProvider;

/// Feature-hashing embedding provider.
pub struct HashingProvider {
    dimension: usize,
    model: String,
}

impl HashingProvider {
    /// Create a provider producing vectors of `dimension` components.
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            dimension,
            model: format!("feature-hash-{dimension}"),
        }
    }

    fn bucket(&self, token: &str) -> (usize, f32) {
        let digest = Sha256::digest(token.as_bytes());
        let mut index_bytes = [0u8; 8];
        index_bytes.copy_from_slice(&digest[..8]);
        let index = (u64::from_le_bytes(index_bytes) % self.dimension as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        (index, sign)
    }
}

#[async_trait]
impl EmbeddingProvider for HashingProvider {
    fn name(&self) -> &str {
        "hashing"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> Option<usize> {
        Some(self.dimension)
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let mut embedding = vec![0.0f32; self.dimension];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let (index, sign) = self.bucket(&token.to_lowercase());
            embedding[index] += sign;
        }
        Ok(embedding)
    }

    fn is_available(&self) -> bool {
        true
    }
}
