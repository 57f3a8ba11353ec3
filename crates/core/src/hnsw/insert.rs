//! HNSW insertion algorithm.
//!
//! Inserts a vector into the HNSW graph with bidirectional connections and
//! heuristic neighbor pruning (Algorithm 4 from the HNSW paper).

use crate::error::Result;
use crate::hnsw::graph::{HnswIndex, NeighborSelection};
use crate::hnsw::search::{descend, search_layer};
use crate::hnsw::visited::VisitedSet;

impl HnswIndex {
    /// Insert a new vector into the HNSW index and return its id.
    ///
    /// The dimension is checked before anything is stored, so a rejected vector
    /// leaves the index untouched. Ids are assigned sequentially from 0.
    pub fn insert(&mut self, vector: &[f32]) -> Result<u32> {
        self.check_dimension(vector)?;
        let id = self.add_node(vector)?;
        let level = self.level(id);

        // First node becomes the entry point
        let entry_point = match self.entry_point {
            Some(ep) => ep,
            None => {
                self.promote_entry_point(id);
                return Ok(id);
            }
        };

        // Phase 1: Greedily traverse from top layer down to node's level + 1
        let mut current_ep = descend(self, vector, entry_point, level);

        // Phase 2: Search each layer, select diverse neighbors, wire links.
        // The new node has no incoming links yet, so searches never reach it.
        let mut visited = VisitedSet::new(self.len());
        let top = level.min(self.max_layer);
        for layer in (0..=top).rev() {
            let candidates = search_layer(
                self,
                vector,
                std::slice::from_ref(&current_ep),
                self.config.ef_construction,
                layer,
                &mut visited,
            );

            let capacity = self.max_connections(layer);
            let selected = select_neighbors(self, &candidates, capacity, self.config.selection);
            for &(_, neighbor_id) in &selected {
                self.connect(id, neighbor_id, layer)?;
            }

            // Nearest candidate seeds the next (lower) layer
            if let Some(&(_, nearest)) = candidates.first() {
                current_ep = nearest;
            }
        }

        // Update entry point if new node has higher layer
        self.promote_entry_point(id);
        Ok(id)
    }
}

/// Heuristic neighbor selection (Algorithm 4 from the HNSW paper).
///
/// `candidates` holds `(distance_to_base, id)` pairs. Walking them nearest first, a
/// candidate is kept only if it is strictly closer to the base than to every neighbor
/// kept so far. With [`NeighborSelection::Lenient`] the remaining slots are then
/// backfilled with the nearest rejected candidates.
pub(crate) fn select_neighbors(
    index: &HnswIndex,
    candidates: &[(f32, u32)],
    capacity: usize,
    selection: NeighborSelection,
) -> Vec<(f32, u32)> {
    let mut sorted = candidates.to_vec();
    sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut selected: Vec<(f32, u32)> = Vec::with_capacity(capacity);
    let mut rejected: Vec<(f32, u32)> = Vec::new();

    for &(dist_to_base, cid) in &sorted {
        if selected.len() >= capacity {
            break;
        }
        let is_diverse = selected
            .iter()
            .all(|&(_, sid)| dist_to_base < index.distance_between(cid, sid));
        if is_diverse {
            selected.push((dist_to_base, cid));
        } else {
            rejected.push((dist_to_base, cid));
        }
    }

    if selection == NeighborSelection::Lenient {
        let room = capacity - selected.len();
        selected.extend(rejected.into_iter().take(room));
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HnswError;
    use crate::hnsw::graph::HnswConfig;
    use crate::hnsw::search::{knn_search, Neighbor};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn config(m: usize, selection: NeighborSelection) -> HnswConfig {
        HnswConfig {
            selection,
            seed: Some(11),
            ..HnswConfig::new(m, 64)
        }
    }

    fn random_vectors(n: usize, dim: usize, seed: u64) -> Vec<Vec<f32>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| (0..dim).map(|_| rng.gen::<f32>()).collect())
            .collect()
    }

    /// Index with three collinear points and one off-axis point, no links.
    fn cluster_index() -> HnswIndex {
        let mut index = HnswIndex::new(2, config(4, NeighborSelection::Strict)).unwrap();
        for v in [[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [0.0, 1.5]] {
            index.add_node_at_level(&v, 0).unwrap();
        }
        index
    }

    #[test]
    fn test_select_strict_drops_shadowed_candidate() {
        let index = cluster_index();
        // base is node 0; node 2 is shadowed by node 1
        let candidates = vec![(4.0, 2), (1.0, 1), (2.25, 3)];
        let selected = select_neighbors(&index, &candidates, 3, NeighborSelection::Strict);
        let ids: Vec<u32> = selected.iter().map(|&(_, id)| id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_select_lenient_backfills() {
        let index = cluster_index();
        let candidates = vec![(4.0, 2), (1.0, 1), (2.25, 3)];
        let selected = select_neighbors(&index, &candidates, 3, NeighborSelection::Lenient);
        let ids: Vec<u32> = selected.iter().map(|&(_, id)| id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn test_select_respects_capacity() {
        let index = cluster_index();
        let candidates = vec![(4.0, 2), (1.0, 1), (2.25, 3)];
        let selected = select_neighbors(&index, &candidates, 1, NeighborSelection::Lenient);
        assert_eq!(selected, vec![(1.0, 1)]);
    }

    #[test]
    fn test_select_rejects_duplicate_of_selected() {
        let mut index = HnswIndex::new(2, config(4, NeighborSelection::Strict)).unwrap();
        for v in [[0.0, 0.0], [1.0, 1.0], [1.0, 1.0]] {
            index.add_node_at_level(&v, 0).unwrap();
        }
        let candidates = vec![(2.0, 1), (2.0, 2)];
        let selected = select_neighbors(&index, &candidates, 2, NeighborSelection::Strict);
        assert_eq!(selected, vec![(2.0, 1)]);
    }

    #[test]
    fn test_first_insert_becomes_entry_point() {
        let mut index = HnswIndex::new(3, config(4, NeighborSelection::Strict)).unwrap();
        let id = index.insert(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(id, 0);
        assert_eq!(index.entry_point(), Some(0));
        assert_eq!(index.max_layer(), index.level(0));
    }

    #[test]
    fn test_single_node_index_is_searchable_and_valid() {
        let mut index = HnswIndex::new(2, config(4, NeighborSelection::Strict)).unwrap();
        let id = index.insert(&[0.0, 0.0]).unwrap();
        index.validate().unwrap();
        let hits = knn_search(&index, &[0.0, 0.0], 1, 1).unwrap();
        assert_eq!(hits, vec![Neighbor { id, distance: 0.0 }]);
    }

    #[test]
    fn test_insert_dimension_mismatch_leaves_index_unchanged() {
        let mut index = HnswIndex::new(3, config(4, NeighborSelection::Strict)).unwrap();
        index.insert(&[1.0, 2.0, 3.0]).unwrap();
        let err = index.insert(&[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            HnswError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        );
        assert_eq!(index.len(), 1);
        assert_eq!(index.vectors.len(), 3);
        assert_eq!(index.insert(&[0.0, 0.0, 0.0]).unwrap(), 1);
    }

    #[test]
    fn test_insert_builds_valid_graph() {
        let mut index = HnswIndex::new(8, config(6, NeighborSelection::Strict)).unwrap();
        for v in random_vectors(500, 8, 5) {
            index.insert(&v).unwrap();
        }
        assert_eq!(index.len(), 500);
        index.validate().unwrap();

        let stats = index.stats();
        assert_eq!(stats.nodes_per_layer[0], 500);
        // geometric thinning of upper layers
        for layer in 1..stats.nodes_per_layer.len() {
            assert!(stats.nodes_per_layer[layer] <= stats.nodes_per_layer[layer - 1]);
        }
        // every node is reachable from something at layer 0
        for id in 1..500u32 {
            assert!(!index.neighbors(id, 0).is_empty(), "node {id} has no links");
        }
    }

    #[test]
    fn test_insert_entry_point_holds_max_layer() {
        let mut index = HnswIndex::new(4, config(2, NeighborSelection::Lenient)).unwrap();
        for v in random_vectors(300, 4, 8) {
            index.insert(&v).unwrap();
        }
        let ep = index.entry_point().unwrap();
        assert_eq!(index.level(ep), index.max_layer());
        let top = (0..300u32).map(|id| index.level(id)).max().unwrap();
        assert_eq!(top, index.max_layer());
    }

    #[test]
    fn test_insert_without_pruning_is_symmetric() {
        // 10 nodes never fill a layer-0 list of 32, so no link is ever dropped
        let mut index = HnswIndex::new(4, config(16, NeighborSelection::Lenient)).unwrap();
        for v in random_vectors(10, 4, 3) {
            index.insert(&v).unwrap();
        }
        for id in 0..10u32 {
            for layer in 0..=index.level(id) {
                for &n in index.neighbors(id, layer) {
                    assert!(
                        index.neighbors(n, layer).contains(&id),
                        "edge {id}->{n} at layer {layer} has no reverse"
                    );
                }
            }
        }
        assert_eq!(index.stats().asymmetric_edges, 0);
    }

    #[test]
    fn test_insert_reproducible_with_seed() {
        let data = random_vectors(200, 6, 21);
        let build = || {
            let mut index = HnswIndex::new(6, config(8, NeighborSelection::Strict)).unwrap();
            for v in &data {
                index.insert(v).unwrap();
            }
            index
        };
        let a = build();
        let b = build();
        assert_eq!(a.layers, b.layers);
        assert_eq!(a.neighbors, b.neighbors);
        assert_eq!(a.entry_point, b.entry_point);
    }
}
