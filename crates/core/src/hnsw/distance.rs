//! Distance computation for the HNSW graph.
//!
//! The index ranks vectors by squared Euclidean distance (L2²). It is monotonic
//! in the true Euclidean distance, so neighbor order is identical and no square
//! root is taken on the hot path.

use crate::error::{HnswError, Result};

/// Squared Euclidean distance between two equal-length slices.
///
/// Uses four independent accumulators so the compiler can vectorize the loop.
/// Callers must guarantee `a.len() == b.len()`; use [`distance`] for a checked variant.
#[inline]
pub fn euclidean_sq(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let chunks = a.len() / 4;
    let mut acc = [0.0f32; 4];
    for i in 0..chunks {
        let base = i * 4;
        for lane in 0..4 {
            let d = a[base + lane] - b[base + lane];
            acc[lane] += d * d;
        }
    }
    let mut sum = acc[0] + acc[1] + acc[2] + acc[3];
    for i in chunks * 4..a.len() {
        let d = a[i] - b[i];
        sum += d * d;
    }
    sum
}

/// Checked squared Euclidean distance.
///
/// Fails with [`HnswError::DimensionMismatch`] when the slices differ in length.
pub fn distance(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(HnswError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(euclidean_sq(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_sq_basic() {
        let a = vec![0.0, 0.0, 0.0];
        let b = vec![3.0, 4.0, 0.0];
        let d = euclidean_sq(&a, &b);
        assert!((d - 25.0).abs() < 1e-6, "squared euclidean should be 25, got {d}");
    }

    #[test]
    fn test_euclidean_sq_self_is_zero() {
        let a = vec![0.5, -0.3, 0.8, 0.1, 0.9, -0.2, 0.6, 0.4, 1.5];
        assert_eq!(euclidean_sq(&a, &a), 0.0);
    }

    #[test]
    fn test_euclidean_sq_tail_elements() {
        // 7 elements: one full chunk of 4 plus a 3-element tail
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let b = vec![0.0; 7];
        let expected: f32 = a.iter().map(|x| x * x).sum();
        assert!((euclidean_sq(&a, &b) - expected).abs() < 1e-4);
    }

    #[test]
    fn test_euclidean_sq_symmetric() {
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let b = vec![8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0];
        assert_eq!(euclidean_sq(&a, &b), euclidean_sq(&b, &a));
        assert!((euclidean_sq(&a, &b) - 168.0).abs() < 1e-4);
    }

    #[test]
    fn test_distance_dimension_mismatch() {
        let err = distance(&[1.0, 2.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            HnswError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_distance_ok() {
        assert_eq!(distance(&[1.0, 1.0], &[2.0, 3.0]).unwrap(), 5.0);
    }

    #[test]
    fn test_empty_vectors() {
        assert_eq!(euclidean_sq(&[], &[]), 0.0);
    }
}
