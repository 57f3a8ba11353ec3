//! HNSW search algorithms: greedy descent, single-layer search, and multi-layer KNN.
//!
//! Heap entries are ordered by `(distance, id)` so equal distances resolve to the
//! lower node id. That makes every traversal, and therefore every result list,
//! deterministic for a given graph.

use crate::config;
use crate::error::{HnswError, Result};
use crate::hnsw::graph::HnswIndex;
use crate::hnsw::visited::VisitedSet;
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::cell::RefCell;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

thread_local! {
    /// Thread-local VisitedSet pool for search operations.
    /// Concurrent readers on different threads never share scratch space.
    static SEARCH_VISITED: RefCell<VisitedSet> = RefCell::new(VisitedSet::new(0));
}

/// One search hit: a node id and its squared Euclidean distance to the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    pub id: u32,
    pub distance: f32,
}

/// Heap key: `(distance, id)`. Max-heap order puts the worst result on top.
type Scored = (OrderedFloat<f32>, u32);

#[inline]
fn scored(distance: f32, id: u32) -> Scored {
    (OrderedFloat(distance), id)
}

/// ef=1 hill climbing on one layer.
///
/// Repeatedly moves to the neighbor closest to `query` until no neighbor improves
/// on the current node. Returns `(distance, id)` of the local minimum.
pub fn greedy_closest(index: &HnswIndex, query: &[f32], entry: u32, layer: usize) -> (f32, u32) {
    let mut best = scored(index.distance_to(query, entry), entry);
    loop {
        let current = best.1;
        for &neighbor in index.neighbors(current, layer) {
            let candidate = scored(index.distance_to(query, neighbor), neighbor);
            if candidate < best {
                best = candidate;
            }
        }
        if best.1 == current {
            return (best.0 .0, best.1);
        }
    }
}

/// Descend from the entry point through every layer above `stop_layer`.
/// Returns the node to start from at `stop_layer`.
pub(crate) fn descend(index: &HnswIndex, query: &[f32], entry: u32, stop_layer: usize) -> u32 {
    let mut current = entry;
    for layer in (stop_layer + 1..=index.max_layer).rev() {
        current = greedy_closest(index, query, current, layer).1;
    }
    current
}

/// Search a single layer of the HNSW graph.
///
/// Bounded best-first expansion from `entry_points`, keeping the `ef` closest nodes
/// seen so far. Stops once the closest unexpanded candidate is farther than the worst
/// kept result and `ef` results are held. Returns `(distance, id)` ascending.
/// `visited` is reusable scratch space, reset at the start of each call.
pub fn search_layer(
    index: &HnswIndex,
    query: &[f32],
    entry_points: &[u32],
    ef: usize,
    layer: usize,
    visited: &mut VisitedSet,
) -> Vec<(f32, u32)> {
    visited.reset(index.len());
    let mut candidates: BinaryHeap<Reverse<Scored>> = BinaryHeap::with_capacity(ef * 2);
    let mut results: BinaryHeap<Scored> = BinaryHeap::with_capacity(ef + 1);

    for &ep in entry_points {
        if visited.mark(ep) {
            let entry = scored(index.distance_to(query, ep), ep);
            candidates.push(Reverse(entry));
            results.push(entry);
            if results.len() > ef {
                results.pop();
            }
        }
    }

    while let Some(Reverse(closest)) = candidates.pop() {
        if results.len() >= ef {
            if let Some(&worst) = results.peek() {
                if closest > worst {
                    break;
                }
            }
        }

        for &neighbor in index.neighbors(closest.1, layer) {
            if !visited.mark(neighbor) {
                continue;
            }
            let entry = scored(index.distance_to(query, neighbor), neighbor);
            let admit = results.len() < ef || results.peek().map_or(true, |&worst| entry < worst);
            if admit {
                candidates.push(Reverse(entry));
                results.push(entry);
                if results.len() > ef {
                    results.pop(); // evict worst
                }
            }
        }
    }

    tracing::trace!(layer, ef, visited = visited.marked(), "Layer search finished");
    results
        .into_sorted_vec()
        .into_iter()
        .map(|(distance, id)| (distance.0, id))
        .collect()
}

/// Multi-layer KNN search through the HNSW graph.
///
/// Returns the `k` closest nodes by ascending distance, ties broken by ascending id.
/// An empty index yields an empty result. Fails with `DimensionMismatch` for a query of
/// the wrong length, and with `InvalidArgument` when `k == 0`, `k > MAX_K`, or `ef < k`.
pub fn knn_search(index: &HnswIndex, query: &[f32], k: usize, ef: usize) -> Result<Vec<Neighbor>> {
    index.check_dimension(query)?;
    if k == 0 {
        return Err(HnswError::invalid("k must be > 0"));
    }
    if k > config::MAX_K {
        return Err(HnswError::invalid(format!(
            "k ({}) exceeds maximum {}",
            k,
            config::MAX_K
        )));
    }
    if ef < k {
        return Err(HnswError::invalid(format!("ef ({}) must be >= k ({})", ef, k)));
    }

    let entry_point = match index.entry_point {
        Some(ep) => ep,
        None => return Ok(Vec::new()),
    };

    let mut results = SEARCH_VISITED.with(|cell| {
        let mut visited = cell.borrow_mut();
        // Traverse from top layer down to layer 1 with ef=1
        let layer0_entry = descend(index, query, entry_point, 0);
        search_layer(
            index,
            query,
            std::slice::from_ref(&layer0_entry),
            ef,
            0,
            &mut *visited,
        )
    });

    results.truncate(k);
    Ok(results
        .into_iter()
        .map(|(distance, id)| Neighbor { id, distance })
        .collect())
}

impl HnswIndex {
    /// KNN search with the configured `ef_search` (raised to `k` when smaller).
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        let ef = self.config.ef_search;
        if ef < k {
            tracing::warn!(ef_search = ef, k, "ef_search below k, searching with ef = k");
        }
        knn_search(self, query, k, ef.max(k))
    }
}
