//! Raw and normalized candidate record types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::embedding::Embedding;

/// Open-ended metadata carried with a candidate (title, filing date,
/// country code, ...). Never inspected by the ranking engine; values pass
/// through to the ranked output unmodified.
pub type Metadata = HashMap<String, Value>;

/// A candidate row as delivered by the retrieval layer.
///
/// Deserializes directly from warehouse-style JSON rows: `id` and
/// `vector` are picked up by name, every other field lands in the
/// metadata bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    /// Document identifier. Not required to be unique within a batch;
    /// duplicates produce duplicate output rows.
    pub id: String,
    /// The embedding vector, if the source had one for this document.
    #[serde(default)]
    pub vector: Option<Vec<f64>>,
    /// All remaining row fields.
    #[serde(flatten)]
    pub metadata: Metadata,
}

impl RawCandidate {
    /// Create a new raw candidate with a vector and no metadata.
    pub fn new<S: Into<String>>(id: S, vector: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            vector: Some(vector),
            metadata: Metadata::new(),
        }
    }

    /// Create a raw candidate without a vector.
    pub fn without_vector<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            vector: None,
            metadata: Metadata::new(),
        }
    }

    /// Attach a metadata field.
    pub fn with_metadata<S: Into<String>>(mut self, key: S, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// A validated candidate: identifier, a non-degenerate embedding of the
/// batch dimensionality, and the untouched metadata bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Document identifier.
    pub id: String,
    /// The validated embedding.
    pub embedding: Embedding,
    /// Metadata carried through from the raw row.
    pub metadata: Metadata,
}

impl CandidateRecord {
    /// Get the dimensionality of this candidate's embedding.
    pub fn dimension(&self) -> usize {
        self.embedding.dimension()
    }
}
