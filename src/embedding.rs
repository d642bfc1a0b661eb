//! Feature vector type for document embeddings.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SagittaError};

/// A dense embedding vector for similarity comparison.
///
/// Stores components in double precision. The ranking engine borrows
/// embeddings and never mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    /// The vector components.
    pub data: Vec<f64>,
}

impl Embedding {
    /// Create a new embedding from raw components.
    pub fn new(data: Vec<f64>) -> Self {
        Self { data }
    }

    /// Get the dimensionality of this embedding.
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// Check whether the embedding has no components.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Calculate the L2 norm (magnitude) of this embedding.
    pub fn norm(&self) -> f64 {
        self.data.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    /// Check if this embedding contains only finite values.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    /// Check whether the embedding is degenerate: empty, or with a norm
    /// that is zero or non-finite. Degenerate embeddings cannot produce
    /// meaningful cosine scores.
    pub fn is_degenerate(&self) -> bool {
        if self.data.is_empty() {
            return true;
        }
        let norm = self.norm();
        !(norm.is_finite() && norm > 0.0)
    }

    /// Validate that this embedding has the expected dimension.
    pub fn validate_dimension(&self, expected: usize) -> Result<()> {
        if self.data.len() != expected {
            return Err(SagittaError::dimension_mismatch(expected, self.data.len()));
        }
        Ok(())
    }

    /// Validate this embedding for use as a ranking query.
    ///
    /// Checked once up front so a degenerate query fails fast instead of
    /// producing a full batch of sentinel scores.
    pub fn validate_query(&self) -> Result<()> {
        if self.data.is_empty() {
            return Err(SagittaError::invalid_query("query vector is empty"));
        }
        if !self.is_finite() {
            return Err(SagittaError::invalid_query(
                "query vector contains non-finite values",
            ));
        }
        if self.norm() == 0.0 {
            return Err(SagittaError::invalid_query("query vector has zero norm"));
        }
        Ok(())
    }
}

impl From<Vec<f64>> for Embedding {
    fn from(data: Vec<f64>) -> Self {
        Self::new(data)
    }
}

impl AsRef<[f64]> for Embedding {
    fn as_ref(&self) -> &[f64] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_and_norm() {
        let embedding = Embedding::new(vec![3.0, 4.0]);
        assert_eq!(embedding.dimension(), 2);
        assert!((embedding.norm() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_detection() {
        assert!(Embedding::new(vec![]).is_degenerate());
        assert!(Embedding::new(vec![0.0, 0.0, 0.0]).is_degenerate());
        assert!(Embedding::new(vec![1.0, f64::NAN]).is_degenerate());
        assert!(Embedding::new(vec![f64::INFINITY, 0.0]).is_degenerate());
        assert!(!Embedding::new(vec![0.0, 0.1]).is_degenerate());
    }

    #[test]
    fn test_validate_query() {
        assert!(Embedding::new(vec![1.0, 0.0]).validate_query().is_ok());
        assert!(Embedding::new(vec![]).validate_query().is_err());
        assert!(Embedding::new(vec![0.0, 0.0]).validate_query().is_err());
        assert!(
            Embedding::new(vec![f64::NAN, 1.0])
                .validate_query()
                .is_err()
        );
    }

    #[test]
    fn test_validate_dimension() {
        let embedding = Embedding::new(vec![1.0, 2.0, 3.0]);
        assert!(embedding.validate_dimension(3).is_ok());
        assert!(embedding.validate_dimension(4).is_err());
    }
}
