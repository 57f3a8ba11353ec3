//! HNSW graph structure and configuration.
//!
//! [`HnswConfig`] defines tuning parameters (M, ef_construction, ef_search, neighbor selection).
//! [`HnswIndex`] stores the graph using Struct-of-Arrays layout for cache efficiency:
//! all vector components live contiguously in one arena, with separate arrays for
//! neighbor lists and layer assignments.

use crate::config;
use crate::error::{HnswError, Result};
use crate::hnsw::distance::euclidean_sq;
use crate::hnsw::insert::select_neighbors;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Policy used when the diversity heuristic accepts fewer neighbors than the layer capacity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborSelection {
    /// Keep only candidates that pass the diversity test.
    #[default]
    Strict,
    /// Backfill with the nearest rejected candidates up to capacity.
    Lenient,
}

/// Configuration parameters for an HNSW index.
///
/// Controls the trade-off between build speed, search speed, recall, and memory usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HnswConfig {
    /// Number of bidirectional links per node (except layer 0, which uses `m_max0`).
    pub m: usize,
    /// Maximum links per node at layer 0 (typically `2 * m`).
    pub m_max0: usize,
    /// Candidate list size during index construction.
    pub ef_construction: usize,
    /// Default candidate list size during search (higher = better recall, slower).
    pub ef_search: usize,
    /// Maximum number of layers in the graph.
    pub max_layers: usize,
    /// Neighbor selection policy for new links and pruning.
    #[serde(default)]
    pub selection: NeighborSelection,
    /// Seed for layer assignment. `None` seeds from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for HnswConfig {
    fn default() -> Self {
        Self::new(
            config::HNSW_DEFAULT_M,
            config::HNSW_DEFAULT_EF_CONSTRUCTION,
        )
    }
}

impl HnswConfig {
    /// Config with the given `m` and `ef_construction`; layer 0 holds `2 * m` links.
    pub fn new(m: usize, ef_construction: usize) -> Self {
        Self {
            m,
            m_max0: m.saturating_mul(2),
            ef_construction,
            ef_search: config::HNSW_DEFAULT_EF_SEARCH,
            max_layers: config::HNSW_DEFAULT_MAX_LAYERS,
            selection: NeighborSelection::Strict,
            seed: None,
        }
    }

    /// Check documented preconditions on every parameter.
    pub fn validate(&self) -> Result<()> {
        // 1/ln(m) is infinite for m = 1
        if self.m < 2 {
            return Err(HnswError::invalid(format!("m must be >= 2, got {}", self.m)));
        }
        if self.m_max0 < self.m {
            return Err(HnswError::invalid(format!(
                "m_max0 ({}) must be >= m ({})",
                self.m_max0, self.m
            )));
        }
        if self.ef_construction == 0 {
            return Err(HnswError::invalid("ef_construction must be > 0"));
        }
        if self.ef_search == 0 {
            return Err(HnswError::invalid("ef_search must be > 0"));
        }
        if self.max_layers == 0 || self.max_layers > u8::MAX as usize {
            return Err(HnswError::invalid(format!(
                "max_layers must be in 1..={}, got {}",
                u8::MAX,
                self.max_layers
            )));
        }
        Ok(())
    }

    /// Level generation multiplier `1 / ln(m)`.
    pub fn level_multiplier(&self) -> f64 {
        1.0 / (self.m as f64).ln()
    }
}

/// Per-layer summary of the graph, used for logging and integrity checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub max_layer: usize,
    /// Number of nodes present at each layer.
    pub nodes_per_layer: Vec<usize>,
    /// Number of directed links stored at each layer.
    pub edges_per_layer: Vec<usize>,
    /// Directed links whose reverse link was pruned away.
    pub asymmetric_edges: usize,
}

/// HNSW Index using Struct-of-Arrays (SoA) layout for cache-friendly access.
/// Vector data is stored contiguously in an arena. No HnswNode struct.
#[derive(Debug, Clone)]
pub struct HnswIndex {
    pub(crate) config: HnswConfig,
    // SoA: f32 vector arena, `dimension` floats per node
    pub(crate) vectors: Vec<f32>,
    // SoA: graph structure
    pub(crate) neighbors: Vec<Vec<Vec<u32>>>, // [node_id][layer][neighbor_ids]
    pub(crate) layers: Vec<u8>,
    // Index metadata
    pub(crate) entry_point: Option<u32>,
    pub(crate) max_layer: usize,
    pub(crate) dimension: usize,
    pub(crate) node_count: u32,
    rng: StdRng,
}

impl HnswIndex {
    /// Creates a new empty HNSW index with the given dimension and configuration.
    ///
    /// The layer RNG is seeded from `config.seed` when set, otherwise from OS entropy.
    pub fn new(dimension: usize, config: HnswConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(dimension, config, rng)
    }

    /// Creates a new empty HNSW index with default configuration (M=16, ef_c=200).
    pub fn with_default_config(dimension: usize) -> Result<Self> {
        Self::new(dimension, HnswConfig::default())
    }

    /// Creates a new empty index drawing layer assignments from `rng`.
    pub fn with_rng(dimension: usize, config: HnswConfig, rng: StdRng) -> Result<Self> {
        config.validate()?;
        if dimension == 0 || dimension > config::MAX_DIMENSION {
            return Err(HnswError::invalid(format!(
                "dimension must be in 1..={}, got {}",
                config::MAX_DIMENSION,
                dimension
            )));
        }
        Ok(Self {
            config,
            vectors: Vec::new(),
            neighbors: Vec::new(),
            layers: Vec::new(),
            entry_point: None,
            max_layer: 0,
            dimension,
            node_count: 0,
            rng,
        })
    }

    /// Returns the number of nodes in the index.
    pub fn len(&self) -> usize {
        self.node_count as usize
    }

    /// Returns `true` if the index contains no nodes.
    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn config(&self) -> &HnswConfig {
        &self.config
    }

    /// The node carrying the highest layer, or `None` for an empty index.
    pub fn entry_point(&self) -> Option<u32> {
        self.entry_point
    }

    /// Highest layer present in the graph.
    pub fn max_layer(&self) -> usize {
        self.max_layer
    }

    /// Fail with `DimensionMismatch` unless `vector` matches the index dimension.
    #[inline]
    pub(crate) fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(HnswError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Generate a random layer for a new node using exponential distribution.
    pub fn random_level(&mut self) -> usize {
        let ml = self.config.level_multiplier();
        // gen() yields [0, 1); flip to (0, 1] so ln() stays finite
        let r: f64 = 1.0 - self.rng.gen::<f64>();
        let level = (-r.ln() * ml).floor() as usize;
        level.min(self.config.max_layers - 1)
    }

    /// Store a vector as a new node at a sampled layer. Returns its id.
    ///
    /// The node starts with empty neighbor lists and is not considered for entry
    /// point; [`HnswIndex::insert`] wires it in and promotes it.
    pub(crate) fn add_node(&mut self, vector: &[f32]) -> Result<u32> {
        self.check_dimension(vector)?;
        let level = self.random_level();
        self.push_node(vector, level)
    }

    /// Store a vector as a new node at an explicit layer.
    pub(crate) fn add_node_at_level(&mut self, vector: &[f32], level: usize) -> Result<u32> {
        self.check_dimension(vector)?;
        if level >= self.config.max_layers {
            return Err(HnswError::invalid(format!(
                "level {} exceeds max_layers {}",
                level, self.config.max_layers
            )));
        }
        self.push_node(vector, level)
    }

    fn push_node(&mut self, vector: &[f32], level: usize) -> Result<u32> {
        let id = self.node_count;
        if id == u32::MAX {
            return Err(HnswError::invalid("node id space exhausted"));
        }
        self.vectors.extend_from_slice(vector);
        self.neighbors.push(vec![Vec::new(); level + 1]);
        self.layers.push(level as u8);
        self.node_count += 1;
        Ok(id)
    }

    /// Promote `id` to global entry point if it sits above the current top layer.
    pub(crate) fn promote_entry_point(&mut self, id: u32) {
        let level = self.level(id);
        match self.entry_point {
            None => {
                self.entry_point = Some(id);
                self.max_layer = level;
            }
            Some(_) if level > self.max_layer => {
                tracing::debug!(
                    node = id,
                    from_layer = self.max_layer,
                    to_layer = level,
                    "HNSW entry point promoted"
                );
                self.entry_point = Some(id);
                self.max_layer = level;
            }
            Some(_) => {}
        }
    }

    /// Get a vector slice for the given node. O(1) slice into contiguous arena.
    #[inline]
    pub fn vector(&self, id: u32) -> &[f32] {
        let start = id as usize * self.dimension;
        &self.vectors[start..start + self.dimension]
    }

    /// Returns the layer assignment of the given node.
    #[inline]
    pub fn level(&self, id: u32) -> usize {
        self.layers[id as usize] as usize
    }

    /// Neighbor list of `id` at `layer`; empty above the node's own level.
    #[inline]
    pub fn neighbors(&self, id: u32, layer: usize) -> &[u32] {
        self.neighbors[id as usize]
            .get(layer)
            .map_or(&[], |list| list.as_slice())
    }

    /// Link capacity at `layer`: `m_max0` at layer 0, `m` above.
    #[inline]
    pub fn max_connections(&self, layer: usize) -> usize {
        if layer == 0 {
            self.config.m_max0
        } else {
            self.config.m
        }
    }

    /// Squared Euclidean distance between two stored nodes.
    #[inline]
    pub fn distance_between(&self, a: u32, b: u32) -> f32 {
        euclidean_sq(self.vector(a), self.vector(b))
    }

    /// Squared Euclidean distance from `query` to a stored node.
    /// `query` must already have the index dimension.
    #[inline]
    pub(crate) fn distance_to(&self, query: &[f32], id: u32) -> f32 {
        euclidean_sq(query, self.vector(id))
    }

    /// Link `a` and `b` in both directions at `layer`.
    ///
    /// A side pushed over its capacity is re-pruned with the neighbor selection
    /// heuristic relative to its own vector, which may drop a link on that side only.
    pub fn connect(&mut self, a: u32, b: u32, layer: usize) -> Result<()> {
        for id in [a, b] {
            if id >= self.node_count {
                return Err(HnswError::invalid(format!(
                    "node {} out of bounds (node_count={})",
                    id, self.node_count
                )));
            }
            if layer > self.level(id) {
                return Err(HnswError::invalid(format!(
                    "node {} does not exist at layer {}",
                    id, layer
                )));
            }
        }
        if a == b {
            return Err(HnswError::invalid(format!("self link on node {}", a)));
        }
        self.link(a, b, layer);
        self.link(b, a, layer);
        Ok(())
    }

    /// Add the directed link `from -> to`, pruning `from` if it overflows.
    fn link(&mut self, from: u32, to: u32, layer: usize) {
        let capacity = self.max_connections(layer);
        let list = &mut self.neighbors[from as usize][layer];
        if list.contains(&to) {
            return;
        }
        list.push(to);
        if list.len() > capacity {
            self.prune(from, layer);
        }
    }

    /// Shrink an overfull neighbor list back to capacity.
    fn prune(&mut self, id: u32, layer: usize) {
        let capacity = self.max_connections(layer);
        let base = self.vector(id);
        let candidates: Vec<(f32, u32)> = self.neighbors[id as usize][layer]
            .iter()
            .map(|&nid| (euclidean_sq(base, self.vector(nid)), nid))
            .collect();
        let kept = select_neighbors(self, &candidates, capacity, self.config.selection);
        self.neighbors[id as usize][layer] = kept.into_iter().map(|(_, nid)| nid).collect();
    }

    /// Per-layer node and link counts.
    pub fn stats(&self) -> GraphStats {
        let layer_count = self.layers.iter().max().map_or(0, |&l| l as usize + 1);
        let mut nodes_per_layer = vec![0usize; layer_count];
        let mut edges_per_layer = vec![0usize; layer_count];
        let mut asymmetric_edges = 0;

        for (node_id, node_neighbors) in self.neighbors.iter().enumerate() {
            for (layer, layer_neighbors) in node_neighbors.iter().enumerate() {
                nodes_per_layer[layer] += 1;
                edges_per_layer[layer] += layer_neighbors.len();
                asymmetric_edges += layer_neighbors
                    .iter()
                    .filter(|&&nid| !self.neighbors(nid, layer).contains(&(node_id as u32)))
                    .count();
            }
        }

        GraphStats {
            node_count: self.len(),
            max_layer: self.max_layer,
            nodes_per_layer,
            edges_per_layer,
            asymmetric_edges,
        }
    }

    /// Validate structural invariants.
    ///
    /// Checks that parallel arrays have consistent lengths, that the entry point
    /// carries the top layer, and that every link is in bounds, not a self loop,
    /// within capacity, and not above either endpoint's level.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let nc = self.node_count as usize;

        if self.vectors.len() != nc * self.dimension {
            return Err(format!(
                "vectors.len()={} != node_count({}) * dimension({})",
                self.vectors.len(),
                nc,
                self.dimension
            ));
        }
        if self.neighbors.len() != nc || self.layers.len() != nc {
            return Err(format!(
                "neighbors({}) / layers({}) length != node_count({})",
                self.neighbors.len(),
                self.layers.len(),
                nc
            ));
        }

        match self.entry_point {
            None if nc > 0 => return Err("non-empty index without entry point".to_string()),
            Some(ep) if ep as usize >= nc => {
                return Err(format!("entry_point {} >= node_count {}", ep, nc));
            }
            Some(ep) if self.level(ep) != self.max_layer => {
                return Err(format!(
                    "entry_point level {} != max_layer {}",
                    self.level(ep),
                    self.max_layer
                ));
            }
            _ => {}
        }

        for (node_id, node_neighbors) in self.neighbors.iter().enumerate() {
            let level = self.layers[node_id] as usize;
            if level > self.max_layer {
                return Err(format!(
                    "node {} level {} above max_layer {}",
                    node_id, level, self.max_layer
                ));
            }
            if node_neighbors.len() != level + 1 {
                return Err(format!(
                    "node {} has {} layer lists for level {}",
                    node_id,
                    node_neighbors.len(),
                    level
                ));
            }
            for (layer, layer_neighbors) in node_neighbors.iter().enumerate() {
                if layer_neighbors.len() > self.max_connections(layer) {
                    return Err(format!(
                        "node {} layer {} has {} links (capacity {})",
                        node_id,
                        layer,
                        layer_neighbors.len(),
                        self.max_connections(layer)
                    ));
                }
                for &neighbor in layer_neighbors {
                    if neighbor as usize >= nc {
                        return Err(format!(
                            "neighbor {} out of bounds (node_count={}) at node {} layer {}",
                            neighbor, nc, node_id, layer
                        ));
                    }
                    if neighbor as usize == node_id {
                        return Err(format!("self loop at node {} layer {}", node_id, layer));
                    }
                    if self.level(neighbor) < layer {
                        return Err(format!(
                            "neighbor {} (level {}) linked at layer {} from node {}",
                            neighbor,
                            self.level(neighbor),
                            layer,
                            node_id
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}
