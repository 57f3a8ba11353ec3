//! Exact nearest neighbors by linear scan, and recall against them.
//!
//! Used to measure how closely the approximate search tracks the true answer.

use crate::hnsw::distance::euclidean_sq;
use crate::hnsw::Neighbor;
use ordered_float::OrderedFloat;
use std::collections::HashSet;

/// The `k` vectors closest to `query`, ascending by distance, ties by ascending id.
///
/// Vectors whose length differs from the query are skipped.
pub fn brute_force_knn<V: AsRef<[f32]>>(vectors: &[V], query: &[f32], k: usize) -> Vec<Neighbor> {
    let mut scored: Vec<(OrderedFloat<f32>, u32)> = vectors
        .iter()
        .enumerate()
        .filter(|(_, v)| v.as_ref().len() == query.len())
        .map(|(id, v)| (OrderedFloat(euclidean_sq(query, v.as_ref())), id as u32))
        .collect();
    let k = k.min(scored.len());
    if k == 0 {
        return Vec::new();
    }
    scored.select_nth_unstable(k - 1);
    scored.truncate(k);
    scored.sort_unstable();
    scored
        .into_iter()
        .map(|(distance, id)| Neighbor {
            id,
            distance: distance.0,
        })
        .collect()
}

/// Compute Recall@k: fraction of the first `k` true neighbors found in the first `k` predictions.
pub fn recall_at_k(predicted: &[u32], ground_truth: &[u32], k: usize) -> f64 {
    let k = k.min(ground_truth.len());
    if k == 0 {
        return 1.0;
    }
    let truth: HashSet<u32> = ground_truth.iter().take(k).copied().collect();
    let found = predicted
        .iter()
        .take(k)
        .filter(|id| truth.contains(id))
        .count();
    found as f64 / k as f64
}
