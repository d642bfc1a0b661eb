//! Candidate batch normalization with partial-failure semantics.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::candidate::record::{CandidateRecord, RawCandidate};
use crate::embedding::Embedding;
use crate::error::{Result, SagittaError};

/// Why a candidate entry was dropped during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionReason {
    /// Vector missing, empty, or of zero/non-finite magnitude.
    EmptyOrZeroVector,
    /// Vector length disagrees with the established batch dimensionality.
    DimensionMismatch { expected: usize, actual: usize },
    /// Row could not be parsed into a candidate at all (JSON ingestion
    /// only; the typed path cannot produce this).
    MalformedEntry(String),
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::EmptyOrZeroVector => {
                write!(f, "vector is missing, empty, or has zero magnitude")
            }
            RejectionReason::DimensionMismatch { expected, actual } => {
                write!(f, "dimension mismatch: expected {expected}, got {actual}")
            }
            RejectionReason::MalformedEntry(msg) => write!(f, "malformed entry: {msg}"),
        }
    }
}

/// A dropped entry, reported with enough context to diagnose without
/// re-scanning the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedCandidate {
    /// Zero-based position of the entry in the raw input.
    pub index: usize,
    /// Identifier of the entry, when one could be read.
    pub id: Option<String>,
    /// Why the entry was dropped.
    pub reason: RejectionReason,
}

/// Result of normalizing one raw candidate batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBatch {
    /// Accepted candidates, in input order.
    pub valid: Vec<CandidateRecord>,
    /// Dropped entries with their reasons, in input order.
    pub rejected: Vec<RejectedCandidate>,
    /// Batch dimensionality, once established by the first valid vector
    /// (or configured explicitly). `None` only if no entry was accepted
    /// and no dimension was configured.
    pub dimension: Option<usize>,
}

impl NormalizedBatch {
    /// Number of accepted candidates.
    pub fn len(&self) -> usize {
        self.valid.len()
    }

    /// Check whether no candidate was accepted.
    pub fn is_empty(&self) -> bool {
        self.valid.is_empty()
    }
}

/// Turns an arbitrary, possibly malformed collection of raw candidate
/// entries into a clean batch ready for scoring.
///
/// A single bad row never aborts the batch: each malformed entry is
/// dropped and recorded, and processing continues. Only a structurally
/// invalid top-level payload is fatal (see [`normalize_json`]).
///
/// [`normalize_json`]: CandidateSetBuilder::normalize_json
#[derive(Debug, Clone, Default)]
pub struct CandidateSetBuilder {
    expected_dimension: Option<usize>,
}

impl CandidateSetBuilder {
    /// Create a builder that takes the batch dimensionality from the
    /// first valid vector it encounters.
    pub fn new() -> Self {
        Self {
            expected_dimension: None,
        }
    }

    /// Create a builder with an explicitly required dimensionality.
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            expected_dimension: Some(dimension),
        }
    }

    /// Normalize a collection of raw candidate entries.
    ///
    /// Accepted candidates preserve input order. Entries with a missing,
    /// empty, or degenerate vector are rejected as `EmptyOrZeroVector`;
    /// entries whose length disagrees with the batch dimensionality are
    /// rejected as `DimensionMismatch`. Duplicate identifiers pass
    /// through untouched.
    pub fn normalize<I>(&self, raw_entries: I) -> NormalizedBatch
    where
        I: IntoIterator<Item = RawCandidate>,
    {
        let mut dimension = self.expected_dimension;
        let mut valid = Vec::new();
        let mut rejected = Vec::new();

        for (index, raw) in raw_entries.into_iter().enumerate() {
            Self::admit(index, raw, &mut dimension, &mut valid, &mut rejected);
        }

        Self::report(&valid, &rejected);

        NormalizedBatch {
            valid,
            rejected,
            dimension,
        }
    }

    /// Normalize a batch delivered as a JSON value.
    ///
    /// The value must be an array of row objects; anything else is a
    /// fatal [`SagittaError::MalformedBatch`]. Individual rows that fail
    /// to deserialize are rejected as `MalformedEntry` and processing
    /// continues, matching the typed path's partial-failure semantics.
    pub fn normalize_json(&self, batch: &Value) -> Result<NormalizedBatch> {
        let rows = batch
            .as_array()
            .ok_or_else(|| SagittaError::malformed_batch("candidate payload is not an array"))?;

        let mut dimension = self.expected_dimension;
        let mut valid = Vec::new();
        let mut rejected = Vec::new();

        for (index, row) in rows.iter().enumerate() {
            if !row.is_object() {
                rejected.push(RejectedCandidate {
                    index,
                    id: None,
                    reason: RejectionReason::MalformedEntry("row is not an object".to_string()),
                });
                continue;
            }

            let raw: RawCandidate = match serde_json::from_value(row.clone()) {
                Ok(raw) => raw,
                Err(err) => {
                    // Salvage the id for the report when the row has one.
                    let id = row
                        .get("id")
                        .and_then(Value::as_str)
                        .map(ToString::to_string);
                    rejected.push(RejectedCandidate {
                        index,
                        id,
                        reason: RejectionReason::MalformedEntry(err.to_string()),
                    });
                    continue;
                }
            };

            Self::admit(index, raw, &mut dimension, &mut valid, &mut rejected);
        }

        Self::report(&valid, &rejected);

        Ok(NormalizedBatch {
            valid,
            rejected,
            dimension,
        })
    }

    /// Screen one raw entry and push it onto the valid or rejected list.
    fn admit(
        index: usize,
        raw: RawCandidate,
        dimension: &mut Option<usize>,
        valid: &mut Vec<CandidateRecord>,
        rejected: &mut Vec<RejectedCandidate>,
    ) {
        match Self::screen(&raw, dimension) {
            None => {
                let RawCandidate { id, vector, metadata } = raw;
                valid.push(CandidateRecord {
                    id,
                    // screen() accepted, so the vector is present
                    embedding: Embedding::new(vector.unwrap_or_default()),
                    metadata,
                });
            }
            Some(reason) => {
                rejected.push(RejectedCandidate {
                    index,
                    id: Some(raw.id),
                    reason,
                });
            }
        }
    }

    fn report(valid: &[CandidateRecord], rejected: &[RejectedCandidate]) {
        if !rejected.is_empty() {
            debug!(
                rejected = rejected.len(),
                accepted = valid.len(),
                "dropped candidates during batch normalization"
            );
        }
    }

    /// Screen one raw entry. Returns the rejection reason, or `None` if
    /// the entry is acceptable. Establishes the batch dimensionality on
    /// the first accepted vector.
    ///
    /// The degenerate-vector check runs before the dimension check, so an
    /// empty vector reports `EmptyOrZeroVector` rather than a mismatch
    /// against the batch dimensionality.
    fn screen(raw: &RawCandidate, dimension: &mut Option<usize>) -> Option<RejectionReason> {
        let vector = match raw.vector.as_deref() {
            Some(v) if !v.is_empty() => v,
            _ => return Some(RejectionReason::EmptyOrZeroVector),
        };

        let norm_sq: f64 = vector.iter().map(|x| x * x).sum();
        if !(norm_sq.is_finite() && norm_sq > 0.0) {
            return Some(RejectionReason::EmptyOrZeroVector);
        }

        match *dimension {
            Some(expected) if vector.len() != expected => {
                Some(RejectionReason::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                })
            }
            Some(_) => None,
            None => {
                *dimension = Some(vector.len());
                None
            }
        }
    }
}
