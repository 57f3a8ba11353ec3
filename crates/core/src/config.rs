//! Global configuration constants for hnswkit.
//!
//! All tuning defaults and input validation limits are defined here.
//! These are compile-time constants; runtime configuration is handled via
//! [`HnswConfig`](crate::hnsw::HnswConfig) and the command line arguments of
//! the evaluation driver.

/// Default number of bidirectional links per HNSW node.
///
/// Higher values improve recall but increase memory and build time.
/// Typical range: 8–64. Default: 16.
pub const HNSW_DEFAULT_M: usize = 16;

/// Default ef parameter during HNSW index construction.
///
/// Controls the size of the dynamic candidate list during insertion.
/// Higher values produce a better graph but slow down build time.
pub const HNSW_DEFAULT_EF_CONSTRUCTION: usize = 200;

/// Default ef parameter during HNSW search.
///
/// Controls the size of the dynamic candidate list during query.
/// Higher values improve recall at the cost of latency.
pub const HNSW_DEFAULT_EF_SEARCH: usize = 200;

/// Maximum number of layers in the HNSW graph.
pub const HNSW_DEFAULT_MAX_LAYERS: usize = 16;

/// Maximum allowed vector dimension.
pub const MAX_DIMENSION: usize = 4096;

/// Maximum number of results (`k`) per search request.
pub const MAX_K: usize = 10_000;

/// Default number of neighbors returned by the evaluation driver.
pub const DEFAULT_K: usize = 10;

/// Default directory holding benchmark vector files.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Default benchmark dataset name (ann-benchmarks naming).
pub const DEFAULT_DATASET: &str = "sift-128-euclidean";

/// Dimension of the SIFT benchmark vectors.
pub const EXPECTED_SIFT_DIMENSION: usize = 128;

/// File the evaluation driver writes neighbor ids to, one per line.
pub const DEFAULT_OUTPUT_FILE: &str = "output.txt";
