//! Error types for the Sagitta library.
//!
//! All fatal failures are represented by the [`SagittaError`] enum.
//! Per-candidate problems encountered while normalizing a batch are not
//! errors; they are reported as rejection data (see
//! [`crate::candidate::RejectionReason`]).

use std::io;

use thiserror::Error;

/// The main error type for Sagitta operations.
#[derive(Error, Debug)]
pub enum SagittaError {
    /// The query vector is missing, empty, or has zero/non-finite norm.
    /// Fatal to the ranking call; no meaningful scores can be produced.
    #[error("Invalid query vector: {0}")]
    InvalidQueryVector(String),

    /// The query vector's dimensionality disagrees with the candidate
    /// batch. Candidate-level mismatches are rejections, not errors.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The raw candidate payload is not structured as expected (e.g. a
    /// JSON value that is not an array of row objects). Fatal, since no
    /// partial processing is possible.
    #[error("Malformed batch input: {0}")]
    MalformedBatch(String),

    /// The requested document does not exist in the embedding source.
    /// Distinct from a document that exists with a degenerate vector.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The embedding source failed to produce data.
    #[error("Source error: {0}")]
    Source(String),

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error.
    #[error("Error: {0}")]
    Anyhow(#[from] anyhow::Error),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with [`SagittaError`].
pub type Result<T> = std::result::Result<T, SagittaError>;

impl SagittaError {
    /// Create a new invalid query vector error.
    pub fn invalid_query<S: Into<String>>(msg: S) -> Self {
        SagittaError::InvalidQueryVector(msg.into())
    }

    /// Create a new dimension mismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        SagittaError::DimensionMismatch { expected, actual }
    }

    /// Create a new malformed batch error.
    pub fn malformed_batch<S: Into<String>>(msg: S) -> Self {
        SagittaError::MalformedBatch(msg.into())
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        SagittaError::NotFound(msg.into())
    }

    /// Create a new source error.
    pub fn source<S: Into<String>>(msg: S) -> Self {
        SagittaError::Source(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SagittaError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = SagittaError::invalid_query("zero norm");
        assert_eq!(error.to_string(), "Invalid query vector: zero norm");

        let error = SagittaError::dimension_mismatch(3, 2);
        assert_eq!(error.to_string(), "Dimension mismatch: expected 3, got 2");

        let error = SagittaError::malformed_batch("not an array");
        assert_eq!(error.to_string(), "Malformed batch input: not an array");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error = SagittaError::from(io_error);

        match error {
            SagittaError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = SagittaError::from(json_error);

        match error {
            SagittaError::Json(_) => {}
            _ => panic!("Expected JSON error variant"),
        }
    }
}
