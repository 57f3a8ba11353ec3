//! # hnsw-eval
//!
//! Evaluation driver for `hnswkit-core`: load a benchmark dataset, build an HNSW index
//! over its base vectors, run one query, and write the ids of the approximate nearest
//! neighbors to a file.

/// Binary vector file reader/writer and split resolution.
pub mod dataset;
/// Result file writer.
pub mod output;

use dataset::{Dataset, DatasetError};
use hnswkit_core::ground_truth::{brute_force_knn, recall_at_k};
use hnswkit_core::{build_with_config, search, HnswConfig, HnswError};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Index(#[from] HnswError),

    #[error("Failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Query index {index} out of range ({available} queries available)")]
    QueryOutOfRange { index: usize, available: usize },

    #[error("Dataset has no base vectors")]
    EmptyDataset,
}

/// Everything one evaluation run needs.
#[derive(Debug, Clone)]
pub struct EvalOptions {
    pub data_dir: PathBuf,
    pub dataset: String,
    pub config: HnswConfig,
    pub k: usize,
    pub query_index: usize,
    pub output: PathBuf,
    pub expected_dimension: Option<usize>,
    pub compute_recall: bool,
}

/// Summary of one evaluation run.
#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    pub dataset: String,
    pub dimension: usize,
    pub base_vectors: usize,
    pub config: HnswConfig,
    pub build_ms: u64,
    pub query_us: u64,
    pub ids: Vec<u32>,
    pub distances: Vec<f32>,
    /// Recall@k against an exact linear scan, when requested.
    pub recall: Option<f64>,
    pub output: PathBuf,
}

/// Load, build, query, and write the result ids.
pub fn run(options: &EvalOptions) -> Result<EvalReport, EvalError> {
    let dataset = Dataset::open(&options.data_dir, &options.dataset)?;
    tracing::info!(
        dataset = %dataset.name,
        base = dataset.base.len(),
        queries = dataset.queries.len(),
        dimension = dataset.dimension,
        "Dataset loaded"
    );

    if let Some(expected) = options.expected_dimension {
        if dataset.dimension != expected {
            tracing::warn!(expected, actual = dataset.dimension, "Unexpected vector dimension");
        }
    }
    if dataset.base.is_empty() {
        return Err(EvalError::EmptyDataset);
    }
    let query = dataset
        .queries
        .get(options.query_index)
        .ok_or(EvalError::QueryOutOfRange {
            index: options.query_index,
            available: dataset.queries.len(),
        })?;

    let started = Instant::now();
    let index = build_with_config(dataset.dimension, &dataset.base, options.config.clone())?;
    let build_ms = started.elapsed().as_millis() as u64;
    let stats = index.stats();
    tracing::info!(
        nodes = stats.node_count,
        max_layer = stats.max_layer,
        nodes_per_layer = ?stats.nodes_per_layer,
        build_ms,
        "Index ready"
    );

    let mut ef_search = options.config.ef_search;
    if ef_search < options.k {
        tracing::warn!(
            ef_search,
            k = options.k,
            "ef_search below k, searching with ef = k"
        );
        ef_search = options.k;
    }
    let started = Instant::now();
    let hits = search(&index, query, options.k, ef_search)?;
    let query_us = started.elapsed().as_micros() as u64;
    let (ids, distances): (Vec<u32>, Vec<f32>) = hits.into_iter().unzip();

    let recall = options.compute_recall.then(|| {
        let truth: Vec<u32> = brute_force_knn(&dataset.base, query, options.k)
            .into_iter()
            .map(|n| n.id)
            .collect();
        recall_at_k(&ids, &truth, options.k)
    });

    output::write_ids(&options.output, &ids).map_err(|source| EvalError::Output {
        path: options.output.clone(),
        source,
    })?;
    tracing::info!(
        k = options.k,
        ef_search,
        query_us,
        recall = ?recall,
        output = %options.output.display(),
        "Top-k ids written"
    );

    Ok(EvalReport {
        dataset: dataset.name,
        dimension: dataset.dimension,
        base_vectors: dataset.base.len(),
        config: options.config.clone(),
        build_ms,
        query_us,
        ids,
        distances,
        recall,
        output: options.output.clone(),
    })
}
