//! Hierarchical Navigable Small World (HNSW) approximate nearest neighbor index.
//!
//! Vectors are stored as raw f32 in a contiguous arena and compared with squared
//! Euclidean distance. The graph uses a Struct-of-Arrays (SoA) layout: separate
//! arrays for vector data, neighbor lists, and layer assignments.
//!
//! Insertion and search are single-threaded per call. Searches only read the graph
//! and may run in parallel with each other; an insertion must exclude every other
//! operation (see [`crate::shared::SharedIndex`]).

/// Squared Euclidean distance.
pub mod distance;
/// HNSW graph structure, configuration, and data storage.
pub mod graph;
/// HNSW insertion algorithm with bidirectional connections and heuristic pruning.
pub mod insert;
/// HNSW search: greedy descent, single-layer search, and multi-layer KNN.
pub mod search;
/// Epoch-stamped visited set for efficient graph traversal.
pub mod visited;

pub use graph::{GraphStats, HnswConfig, HnswIndex, NeighborSelection};
pub use search::{knn_search, Neighbor};
