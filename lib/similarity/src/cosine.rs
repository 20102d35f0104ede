//! Cosine similarity over sparse term vectors

use crate::rank::{rank, RankingPolicy, SimilarityResult};
use crate::tfidf::{TermVector, TermVectors};
use folio_core::{Error, Result};

/// Dot product over shared terms divided by the product of both full norms.
/// Zero when either vector has no weight.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f32 {
    let norm_a = a.norm();
    let norm_b = b.norm();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    // walk the smaller vector
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f32 = small
        .iter()
        .filter_map(|(term, w)| large.get(term).map(|other| w * other))
        .sum();

    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

/// Ranks records by cosine similarity of their precomputed term vectors
#[derive(Debug, Clone)]
pub struct CosineRanker {
    policy: RankingPolicy,
}

impl CosineRanker {
    pub fn new(policy: RankingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RankingPolicy {
        &self.policy
    }

    /// Related records for `filename`; `VectorUnavailable` when it has no vector
    pub fn related(&self, filename: &str, vectors: &TermVectors, folder: Option<&str>) -> Result<Vec<SimilarityResult>> {
        let reference = vectors
            .get(filename)
            .ok_or_else(|| Error::VectorUnavailable(filename.to_string()))?;

        let related = rank(filename, vectors, folder, &self.policy, |other: &TermVector| {
            cosine_similarity(reference, other)
        });
        tracing::debug!(filename, related = related.len(), "cosine ranking");
        Ok(related)
    }
}

impl Default for CosineRanker {
    fn default() -> Self {
        Self::new(RankingPolicy::COSINE)
    }
}
