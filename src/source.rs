//! Embedding retrieval seam.
//!
//! The ranking core never talks to a warehouse itself; it consumes a
//! query embedding and a raw candidate batch through the
//! [`EmbeddingSource`] trait. Network clients, retries, and query
//! construction live behind implementations of this trait, which keeps
//! the core property-testable without any external service.

use std::collections::HashMap;

use crate::candidate::RawCandidate;
use crate::embedding::Embedding;
use crate::error::Result;

/// A provider of document embeddings and candidate batches.
pub trait EmbeddingSource {
    /// Look up the embedding for one document.
    ///
    /// Returns `Ok(None)` when the document is not present in the source
    /// at all. A document that exists but carries an empty or degenerate
    /// vector is returned as-is; deciding that it cannot serve as a
    /// query is the ranking engine's job, and the two outcomes must stay
    /// distinguishable.
    fn query_embedding(&self, id: &str) -> Result<Option<Embedding>>;

    /// Fetch the raw candidate pool for one query document.
    ///
    /// How the pool is filtered (classification codes, date windows,
    /// jurisdiction) is entirely the source's business; the core only
    /// sees the resulting rows.
    fn candidates_for(&self, query_id: &str) -> Result<Vec<RawCandidate>>;
}

/// An in-memory embedding source.
///
/// Serves tests and embedders that already hold their data, e.g. rows
/// loaded from a local JSONL export.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    embeddings: HashMap<String, Embedding>,
    candidates: Vec<RawCandidate>,
}

impl InMemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an embedding under a document id.
    pub fn insert_embedding<S: Into<String>>(&mut self, id: S, embedding: Embedding) {
        self.embeddings.insert(id.into(), embedding);
    }

    /// Add a candidate row to the pool.
    pub fn insert_candidate(&mut self, candidate: RawCandidate) {
        self.candidates.push(candidate);
    }

    /// Number of candidate rows in the pool.
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }
}

impl EmbeddingSource for InMemorySource {
    fn query_embedding(&self, id: &str) -> Result<Option<Embedding>> {
        Ok(self.embeddings.get(id).cloned())
    }

    fn candidates_for(&self, _query_id: &str) -> Result<Vec<RawCandidate>> {
        Ok(self.candidates.clone())
    }
}
