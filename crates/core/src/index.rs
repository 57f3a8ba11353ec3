//! Two-call interface over the HNSW index: [`build`] and [`search`].

use crate::error::{HnswError, Result};
use crate::hnsw::{knn_search, HnswConfig, HnswIndex};
use std::time::Instant;

/// Build an index by inserting `vectors` in order with the given `m` and `ef_construction`.
///
/// The dimension is taken from the first vector. Node `i` of the result holds
/// `vectors[i]`. Fails with `InvalidArgument` for an empty input or bad parameters,
/// and with `DimensionMismatch` if a later vector disagrees with the first.
pub fn build<V: AsRef<[f32]>>(vectors: &[V], m: usize, ef_construction: usize) -> Result<HnswIndex> {
    let dimension = vectors
        .first()
        .map(|v| v.as_ref().len())
        .ok_or_else(|| HnswError::invalid("cannot infer dimension from an empty vector list"))?;
    build_with_config(dimension, vectors, HnswConfig::new(m, ef_construction))
}

/// Build an index of a known dimension with a full configuration.
pub fn build_with_config<V: AsRef<[f32]>>(
    dimension: usize,
    vectors: &[V],
    config: HnswConfig,
) -> Result<HnswIndex> {
    let mut index = HnswIndex::new(dimension, config)?;
    let started = Instant::now();
    for vector in vectors {
        index.insert(vector.as_ref())?;
    }
    tracing::info!(
        nodes = index.len(),
        dimension,
        max_layer = index.max_layer(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "HNSW index built"
    );
    Ok(index)
}

/// Return the `k` nearest stored vectors to `query` as `(id, distance)` pairs,
/// ascending by squared Euclidean distance.
pub fn search(index: &HnswIndex, query: &[f32], k: usize, ef_search: usize) -> Result<Vec<(u32, f32)>> {
    Ok(knn_search(index, query, k, ef_search)?
        .into_iter()
        .map(|n| (n.id, n.distance))
        .collect())
}
