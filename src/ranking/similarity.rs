//! Cosine similarity primitives.

use rayon::prelude::*;

use crate::error::{Result, SagittaError};

/// Batches at least this large are scored with rayon; smaller ones
/// sequentially. Both paths collect in input order, so the choice never
/// affects the output.
pub(crate) const PARALLEL_THRESHOLD: usize = 100;

/// Dot product of two equal-length slices.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// L2 norm of a slice.
pub fn norm(a: &[f64]) -> f64 {
    a.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Calculate the cosine similarity between two vectors.
///
/// Computed in double precision as `dot(a, b) / (‖a‖ · ‖b‖)`. If either
/// vector has zero norm the defined sentinel `0.0` is returned instead
/// of a division error. The output is not clamped: rounding may push it
/// past [-1, 1] by epsilon, so callers must only assert the range with a
/// tolerance.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(SagittaError::dimension_mismatch(a.len(), b.len()));
    }

    let norm_a = norm(a);
    let norm_b = norm(b);

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot(a, b) / (norm_a * norm_b))
}

/// Calculate cosine similarities between a query and a batch of vectors.
///
/// Scores come back in input order regardless of whether the sequential
/// or the parallel path ran, which is what keeps downstream tie-breaking
/// deterministic.
pub fn batch_cosine<V: AsRef<[f64]> + Sync>(query: &[f64], vectors: &[V]) -> Result<Vec<f64>> {
    if vectors.is_empty() {
        return Ok(Vec::new());
    }

    if vectors.len() < PARALLEL_THRESHOLD {
        return vectors
            .iter()
            .map(|v| cosine_similarity(query, v.as_ref()))
            .collect::<Result<Vec<_>>>();
    }

    vectors
        .par_iter()
        .map(|v| cosine_similarity(query, v.as_ref()))
        .collect::<Result<Vec<_>>>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical_direction() {
        let score = cosine_similarity(&[1.0, 0.0, 0.0], &[2.0, 0.0, 0.0]).unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_orthogonal_and_opposite() {
        let score = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(score.abs() < 1e-12);

        let score = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap();
        assert!((score + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_zero_norm_sentinel() {
        let score = cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]).unwrap();
        assert_eq!(score, 0.0);

        let score = cosine_similarity(&[1.0, 1.0], &[0.0, 0.0]).unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_cosine_dimension_mismatch() {
        assert!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]).is_err());
    }

    #[test]
    fn test_cosine_unclamped() {
        // The contract forbids clamping; a tolerance-based range check is
        // all callers may rely on.
        let a = vec![0.1; 512];
        let b = vec![0.1; 512];
        let score = cosine_similarity(&a, &b).unwrap();
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_batch_matches_single_across_threshold() {
        let query = vec![0.3, -0.2, 0.9];
        let vectors: Vec<Vec<f64>> = (0..PARALLEL_THRESHOLD + 50)
            .map(|i| {
                let x = (i as f64 * 0.37).sin();
                vec![x, 1.0 - x, x * 0.5]
            })
            .collect();

        let batch = batch_cosine(&query, &vectors).unwrap();
        assert_eq!(batch.len(), vectors.len());
        for (v, score) in vectors.iter().zip(&batch) {
            assert_eq!(*score, cosine_similarity(&query, v).unwrap());
        }
    }

    #[test]
    fn test_batch_empty() {
        let batch = batch_cosine::<Vec<f64>>(&[1.0], &[]).unwrap();
        assert!(batch.is_empty());
    }
}
