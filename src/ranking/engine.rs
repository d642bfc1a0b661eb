//! The Top-K vector ranking engine.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::candidate::{CandidateRecord, Metadata};
use crate::embedding::Embedding;
use crate::error::Result;
use crate::ranking::similarity;

/// Configuration for ranking operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Number of results to return.
    pub top_k: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self { top_k: 1000 }
    }
}

/// A single ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    /// Document identifier.
    pub id: String,
    /// Cosine similarity to the query. Not clamped; floating point may
    /// exceed [-1, 1] by epsilon.
    pub score: f64,
    /// 1-based position in the ranked output. Strictly positional: tied
    /// scores get consecutive ranks, never a shared one.
    pub rank: usize,
    /// Metadata carried through from the candidate record, sufficient to
    /// serialize a tabular row without further lookups.
    pub metadata: Metadata,
}

/// Computes pairwise similarity between one query vector and a
/// normalized candidate batch, producing a deterministic Top-K.
///
/// The engine is pure and stateless: it borrows its inputs, owns only
/// the result list it returns, and can be shared freely across threads
/// for independent batches.
#[derive(Debug, Clone, Default)]
pub struct VectorRankingEngine {
    config: RankingConfig,
}

impl VectorRankingEngine {
    /// Create a new ranking engine.
    pub fn new(config: RankingConfig) -> Self {
        Self { config }
    }

    /// Get the ranking configuration.
    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Calculate the cosine similarity between a query and one candidate
    /// embedding.
    ///
    /// Fails on a dimension mismatch. A zero-norm vector on either side
    /// yields the sentinel score `0.0` rather than a division error.
    pub fn score(&self, query: &Embedding, candidate: &Embedding) -> Result<f64> {
        similarity::cosine_similarity(&query.data, &candidate.data)
    }

    /// Rank the candidate batch against the query, returning the top
    /// `config.top_k` results.
    pub fn rank(&self, query: &Embedding, candidates: &[CandidateRecord]) -> Result<Vec<RankedResult>> {
        self.rank_top_k(query, candidates, self.config.top_k)
    }

    /// Rank the candidate batch against the query, returning the top `k`
    /// results.
    ///
    /// Every candidate is scored (full scan), results are stable-sorted
    /// descending by score, truncated to `min(k, candidates.len())`, and
    /// assigned 1-based ranks. Candidates with equal scores retain their
    /// relative input order; calling twice with the same inputs returns
    /// identical output, tie ordering included.
    ///
    /// An empty batch or `k == 0` returns an empty list, not an error. A
    /// degenerate query fails fast with `InvalidQueryVector`.
    pub fn rank_top_k(
        &self,
        query: &Embedding,
        candidates: &[CandidateRecord],
        k: usize,
    ) -> Result<Vec<RankedResult>> {
        query.validate_query()?;

        if candidates.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        if let Some(first) = candidates.first() {
            query.validate_dimension(first.dimension())?;
        }

        let vectors: Vec<&[f64]> = candidates.iter().map(|c| c.embedding.as_ref()).collect();
        let scores = similarity::batch_cosine(&query.data, &vectors)?;

        // Stable sort: equal scores keep input order. Scores are finite
        // here (degenerate vectors never reach the engine), so the
        // partial_cmp fallback is unreachable in practice.
        let mut order: Vec<(usize, f64)> = scores.into_iter().enumerate().collect();
        order.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let top_k = k.min(order.len());
        let results: Vec<RankedResult> = order
            .into_iter()
            .take(top_k)
            .enumerate()
            .map(|(position, (index, score))| {
                let candidate = &candidates[index];
                RankedResult {
                    id: candidate.id.clone(),
                    score,
                    rank: position + 1,
                    metadata: candidate.metadata.clone(),
                }
            })
            .collect();

        debug!(
            candidates = candidates.len(),
            returned = results.len(),
            "ranked candidate batch"
        );

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::{CandidateSetBuilder, RawCandidate};
    use crate::error::SagittaError;

    fn records(entries: Vec<RawCandidate>) -> Vec<CandidateRecord> {
        CandidateSetBuilder::new().normalize(entries).valid
    }

    #[test]
    fn test_rank_top_k_concrete_scenario() {
        let engine = VectorRankingEngine::default();
        let query = Embedding::new(vec![1.0, 0.0, 0.0]);
        let candidates = records(vec![
            RawCandidate::new("A", vec![1.0, 0.0, 0.0]),
            RawCandidate::new("B", vec![0.0, 1.0, 0.0]),
            RawCandidate::new("C", vec![0.7, 0.7, 0.0]),
        ]);

        let results = engine.rank_top_k(&query, &candidates, 2).unwrap();
        assert_eq!(results.len(), 2);

        assert_eq!(results[0].id, "A");
        assert_eq!(results[0].rank, 1);
        assert!((results[0].score - 1.0).abs() < 1e-9);

        assert_eq!(results[1].id, "C");
        assert_eq!(results[1].rank, 2);
        assert!((results[1].score - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn test_rank_empty_batch() {
        let engine = VectorRankingEngine::default();
        let query = Embedding::new(vec![1.0, 0.0]);
        let results = engine.rank_top_k(&query, &[], 10).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_rank_k_zero() {
        let engine = VectorRankingEngine::default();
        let query = Embedding::new(vec![1.0, 0.0]);
        let candidates = records(vec![RawCandidate::new("A", vec![1.0, 0.0])]);
        let results = engine.rank_top_k(&query, &candidates, 0).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_rank_degenerate_query_fails_fast() {
        let engine = VectorRankingEngine::default();
        let candidates = records(vec![RawCandidate::new("A", vec![1.0, 0.0])]);

        let err = engine
            .rank_top_k(&Embedding::new(vec![0.0, 0.0]), &candidates, 5)
            .unwrap_err();
        assert!(matches!(err, SagittaError::InvalidQueryVector(_)));

        let err = engine
            .rank_top_k(&Embedding::new(vec![]), &candidates, 5)
            .unwrap_err();
        assert!(matches!(err, SagittaError::InvalidQueryVector(_)));
    }

    #[test]
    fn test_rank_query_dimension_mismatch_is_fatal() {
        let engine = VectorRankingEngine::default();
        let query = Embedding::new(vec![1.0, 0.0, 0.0]);
        let candidates = records(vec![RawCandidate::new("A", vec![1.0, 0.0])]);

        let err = engine.rank_top_k(&query, &candidates, 5).unwrap_err();
        assert!(matches!(err, SagittaError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_tie_break_keeps_input_order() {
        let engine = VectorRankingEngine::default();
        let query = Embedding::new(vec![1.0, 0.0]);
        // Identical vectors, hence bitwise-identical scores.
        let candidates = records(vec![
            RawCandidate::new("first", vec![3.0, 4.0]),
            RawCandidate::new("second", vec![3.0, 4.0]),
            RawCandidate::new("third", vec![3.0, 4.0]),
        ]);

        let results = engine.rank_top_k(&query, &candidates, 3).unwrap();
        assert_eq!(results[0].id, "first");
        assert_eq!(results[1].id, "second");
        assert_eq!(results[2].id, "third");
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[1].rank, 2);
        assert_eq!(results[2].rank, 3);
    }

    #[test]
    fn test_truncation_bounds() {
        let engine = VectorRankingEngine::default();
        let query = Embedding::new(vec![1.0, 0.0]);
        let candidates = records(
            (0..5)
                .map(|i| RawCandidate::new(format!("c{i}"), vec![1.0, i as f64]))
                .collect(),
        );

        for k in 0..10 {
            let results = engine.rank_top_k(&query, &candidates, k).unwrap();
            assert_eq!(results.len(), k.min(candidates.len()));
        }
    }

    #[test]
    fn test_scores_monotonically_decreasing() {
        let engine = VectorRankingEngine::default();
        let query = Embedding::new(vec![0.5, -0.5, 1.0]);
        let candidates = records(
            (0..50)
                .map(|i| {
                    let x = (i as f64 * 0.7).sin();
                    RawCandidate::new(format!("c{i}"), vec![x, x * x, 1.0 - x])
                })
                .collect(),
        );

        let results = engine.rank_top_k(&query, &candidates, 50).unwrap();
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.rank, i + 1);
        }
    }

    #[test]
    fn test_metadata_carried_through() {
        let engine = VectorRankingEngine::default();
        let query = Embedding::new(vec![1.0, 0.0]);
        let candidates = records(vec![
            RawCandidate::new("A", vec![1.0, 0.0])
                .with_metadata("title", serde_json::json!("Locking mechanism")),
        ]);

        let results = engine.rank_top_k(&query, &candidates, 1).unwrap();
        assert_eq!(
            results[0].metadata["title"],
            serde_json::json!("Locking mechanism")
        );
    }

    #[test]
    fn test_rank_uses_configured_top_k() {
        let engine = VectorRankingEngine::new(RankingConfig { top_k: 2 });
        let query = Embedding::new(vec![1.0, 0.0]);
        let candidates = records(
            (0..5)
                .map(|i| RawCandidate::new(format!("c{i}"), vec![1.0, i as f64]))
                .collect(),
        );

        let results = engine.rank(&query, &candidates).unwrap();
        assert_eq!(results.len(), 2);
    }
}
