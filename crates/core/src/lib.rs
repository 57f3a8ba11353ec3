//! # hnswkit-core
//!
//! In-memory HNSW approximate nearest neighbor index, written from scratch.
//!
//! Vectors go in through [`build`] or [`HnswIndex::insert`]; queries come back as
//! `(id, distance)` lists ordered by ascending squared Euclidean distance, where the
//! id is the vector's position in insertion order.
//!
//! ```text
//! raw vectors → insert (construction) → HnswIndex (graph store) → knn_search → [(id, distance)]
//! ```
//!
//! This crate has no async or I/O dependencies; loading datasets and writing results
//! is left to the caller (see the `hnswkit-eval` driver).

/// Global configuration constants: limits, defaults, and tuning parameters.
pub mod config;
/// Error type shared by every index operation.
pub mod error;
/// Exact nearest neighbors and recall measurement.
pub mod ground_truth;
/// HNSW approximate nearest neighbor index: graph structure, search, insertion, and distance.
pub mod hnsw;
/// Two-call entry points: build an index from a vector list, search it.
pub mod index;
/// Reader/writer-locked index handle for concurrent use.
pub mod shared;

pub use error::{HnswError, Result};
pub use hnsw::{HnswConfig, HnswIndex, Neighbor, NeighborSelection};
pub use index::{build, build_with_config, search};
pub use shared::SharedIndex;
