//! Prior-art similarity search: source -> builder -> engine.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::candidate::{CandidateSetBuilder, RejectedCandidate};
use crate::error::{Result, SagittaError};
use crate::ranking::{RankedResult, RankingConfig, VectorRankingEngine};
use crate::source::EmbeddingSource;

/// Everything one search call produced: the ranked results, the
/// rejection report, and scan counters.
///
/// Callers are expected to surface both lists. A batch that silently
/// dropped most of its candidates (say, a systematic dimension mismatch
/// after upstream schema drift) is itself a signal worth reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Identifier of the query document.
    pub query_id: String,
    /// Ranked results, best first.
    pub results: Vec<RankedResult>,
    /// Candidates dropped during normalization.
    pub rejected: Vec<RejectedCandidate>,
    /// Raw candidate rows fetched from the source.
    pub candidates_fetched: usize,
    /// Candidates that survived normalization and were scored.
    pub candidates_scored: usize,
    /// Time spent scoring and sorting, in milliseconds. Observational
    /// only; it does not influence any result.
    pub ranking_time_ms: f64,
}

/// High-level similarity search over a pluggable embedding source.
///
/// Composes retrieval, batch normalization, and ranking the way the
/// surrounding application consumes them: fetch the target document's
/// embedding, fetch its candidate pool, normalize, rank, report.
pub struct SimilaritySearch<S: EmbeddingSource> {
    source: S,
    builder: CandidateSetBuilder,
    engine: VectorRankingEngine,
}

impl<S: EmbeddingSource> SimilaritySearch<S> {
    /// Create a search over the given source with default configuration.
    pub fn new(source: S) -> Self {
        Self::with_config(source, RankingConfig::default())
    }

    /// Create a search with an explicit ranking configuration.
    pub fn with_config(source: S, config: RankingConfig) -> Self {
        Self {
            source,
            builder: CandidateSetBuilder::new(),
            engine: VectorRankingEngine::new(config),
        }
    }

    /// Get the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run one similarity search using the configured `top_k`.
    pub fn search(&self, query_id: &str) -> Result<SearchOutcome> {
        self.search_top_k(query_id, self.engine.config().top_k)
    }

    /// Run one similarity search for the given query document.
    ///
    /// Fails with `NotFound` when the source has no such document, and
    /// with `InvalidQueryVector` when the document exists but its vector
    /// cannot anchor a ranking. Per-candidate problems never fail the
    /// call; they are returned in the outcome's rejection list.
    pub fn search_top_k(&self, query_id: &str, top_k: usize) -> Result<SearchOutcome> {
        info!(query_id, top_k, "starting similarity search");

        let query = self
            .source
            .query_embedding(query_id)?
            .ok_or_else(|| SagittaError::not_found(format!("no embedding for {query_id}")))?;

        let raw = self.source.candidates_for(query_id)?;
        let fetched = raw.len();
        info!(candidates = fetched, "fetched candidate pool");

        let batch = self.builder.normalize(raw);
        if !batch.rejected.is_empty() {
            warn!(
                rejected = batch.rejected.len(),
                scored = batch.valid.len(),
                "candidate pool was partially rejected"
            );
        }

        let start = std::time::Instant::now();
        let results = self.engine.rank_top_k(&query, &batch.valid, top_k)?;
        let ranking_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        if let Some(best) = results.first() {
            info!(
                returned = results.len(),
                top_id = %best.id,
                top_score = best.score,
                "similarity search finished"
            );
        } else {
            info!("similarity search finished with no candidates to rank");
        }

        Ok(SearchOutcome {
            query_id: query_id.to_string(),
            results,
            rejected: batch.rejected,
            candidates_fetched: fetched,
            candidates_scored: batch.valid.len(),
            ranking_time_ms,
        })
    }
}
