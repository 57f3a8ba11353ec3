//! Benchmark dataset loading.
//!
//! Vector files use a flat binary layout: `u32 count`, `u32 dim` (little-endian),
//! then `count * dim` little-endian `f32` values, row-major. HDF5 files such as
//! `sift-128-euclidean.hdf5` are not read; export each split to this layout first.
//!
//! A dataset named `sift-128-euclidean` in `data/` is made of two such files. The base
//! vectors are read from `sift-128-euclidean_train.bin`, or `_base.bin` when there is
//! no train split; the queries from `_test.bin`, or `_query.bin`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const HEADER_LEN: usize = 8;

/// Candidate suffixes for the vectors to index, in lookup order.
pub const BASE_SPLITS: &[&str] = &["train", "base"];
/// Candidate suffixes for the query vectors, in lookup order.
pub const QUERY_SPLITS: &[&str] = &["test", "query"];

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No {role} split for dataset '{name}' (looked for: {tried:?})")]
    MissingSplit {
        name: String,
        role: &'static str,
        tried: Vec<PathBuf>,
    },

    #[error("Malformed vector file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("Base vectors have dimension {base} but queries have dimension {query}")]
    DimensionMismatch { base: usize, query: usize },
}

/// Vectors read from one file.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorFile {
    pub dimension: usize,
    pub vectors: Vec<Vec<f32>>,
}

/// Read a binary vector file: u32 count, u32 dim, then f32 data.
pub fn read_vectors(path: &Path) -> Result<VectorFile, DatasetError> {
    let buf = fs::read(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let malformed = |reason: String| DatasetError::Malformed {
        path: path.to_path_buf(),
        reason,
    };

    if buf.len() < HEADER_LEN {
        return Err(malformed(format!("{} bytes is shorter than the header", buf.len())));
    }
    let count = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
    let dimension = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]) as usize;
    if dimension == 0 && count > 0 {
        return Err(malformed("dimension is zero".to_string()));
    }

    let data = &buf[HEADER_LEN..];
    let expected = count
        .checked_mul(dimension)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| malformed(format!("{count} x {dimension} overflows")))?;
    if data.len() != expected {
        return Err(malformed(format!(
            "header declares {count} x {dimension} floats ({expected} bytes), payload has {} bytes",
            data.len()
        )));
    }

    let vectors = data
        .chunks_exact(dimension.max(1) * 4)
        .take(count)
        .map(|row| {
            row.chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect()
        })
        .collect();

    Ok(VectorFile { dimension, vectors })
}

/// Write vectors in the same binary layout. All rows must share one length.
pub fn write_vectors<V: AsRef<[f32]>>(path: &Path, vectors: &[V]) -> Result<(), DatasetError> {
    let dimension = vectors.first().map_or(0, |v| v.as_ref().len());
    if let Some(bad) = vectors.iter().find(|v| v.as_ref().len() != dimension) {
        return Err(DatasetError::Malformed {
            path: path.to_path_buf(),
            reason: format!("ragged rows: {} vs {}", bad.as_ref().len(), dimension),
        });
    }

    let mut out = Vec::with_capacity(HEADER_LEN + vectors.len() * dimension * 4);
    out.extend_from_slice(&(vectors.len() as u32).to_le_bytes());
    out.extend_from_slice(&(dimension as u32).to_le_bytes());
    for v in vectors {
        for x in v.as_ref() {
            out.extend_from_slice(&x.to_le_bytes());
        }
    }
    fs::write(path, out).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// First existing `{name}_{split}.bin` in `data_dir` among `splits`.
pub fn resolve_split(
    data_dir: &Path,
    name: &str,
    role: &'static str,
    splits: &[&str],
) -> Result<PathBuf, DatasetError> {
    let tried: Vec<PathBuf> = splits
        .iter()
        .map(|split| data_dir.join(format!("{name}_{split}.bin")))
        .collect();
    match tried.iter().find(|p| p.is_file()) {
        Some(path) => Ok(path.clone()),
        None => Err(DatasetError::MissingSplit {
            name: name.to_string(),
            role,
            tried,
        }),
    }
}

/// Base and query vectors of one benchmark dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub dimension: usize,
    pub base: Vec<Vec<f32>>,
    pub queries: Vec<Vec<f32>>,
}

impl Dataset {
    /// Load the base and query splits of `name` from `data_dir`.
    pub fn open(data_dir: &Path, name: &str) -> Result<Self, DatasetError> {
        let base_path = resolve_split(data_dir, name, "base", BASE_SPLITS)?;
        let query_path = resolve_split(data_dir, name, "query", QUERY_SPLITS)?;
        tracing::debug!(base = %base_path.display(), queries = %query_path.display(), "Resolved dataset splits");

        let base = read_vectors(&base_path)?;
        let queries = read_vectors(&query_path)?;
        if !queries.vectors.is_empty() && !base.vectors.is_empty() && base.dimension != queries.dimension {
            return Err(DatasetError::DimensionMismatch {
                base: base.dimension,
                query: queries.dimension,
            });
        }

        Ok(Self {
            name: name.to_string(),
            dimension: base.dimension,
            base: base.vectors,
            queries: queries.vectors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.bin");
        let vectors = vec![vec![1.0f32, -2.5, 3.25], vec![0.0, 0.5, 1e-3]];
        write_vectors(&path, &vectors).unwrap();
        let file = read_vectors(&path).unwrap();
        assert_eq!(file.dimension, 3);
        assert_eq!(file.vectors, vectors);
    }

    #[test]
    fn test_read_truncated_payload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.bin");
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 20]);
        fs::write(&path, bytes).unwrap();
        assert!(matches!(
            read_vectors(&path),
            Err(DatasetError::Malformed { .. })
        ));
    }

    #[test]
    fn test_read_short_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("short.bin");
        fs::write(&path, [1u8, 0, 0]).unwrap();
        assert!(matches!(
            read_vectors(&path),
            Err(DatasetError::Malformed { .. })
        ));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            read_vectors(&dir.path().join("nope.bin")),
            Err(DatasetError::Io { .. })
        ));
    }

    #[test]
    fn test_write_rejects_ragged() {
        let dir = TempDir::new().unwrap();
        let vectors = vec![vec![1.0f32, 2.0], vec![1.0]];
        assert!(write_vectors(&dir.path().join("r.bin"), &vectors).is_err());
    }

    #[test]
    fn test_resolve_split_fallback() {
        let dir = TempDir::new().unwrap();
        write_vectors(&dir.path().join("ds_base.bin"), &[vec![1.0f32]]).unwrap();
        let path = resolve_split(dir.path(), "ds", "base", BASE_SPLITS).unwrap();
        assert!(path.ends_with("ds_base.bin"));

        write_vectors(&dir.path().join("ds_train.bin"), &[vec![1.0f32]]).unwrap();
        let path = resolve_split(dir.path(), "ds", "base", BASE_SPLITS).unwrap();
        assert!(path.ends_with("ds_train.bin"));
    }

    #[test]
    fn test_open_missing_query_split() {
        let dir = TempDir::new().unwrap();
        write_vectors(&dir.path().join("ds_train.bin"), &[vec![1.0f32]]).unwrap();
        match Dataset::open(dir.path(), "ds") {
            Err(DatasetError::MissingSplit { role, tried, .. }) => {
                assert_eq!(role, "query");
                assert_eq!(tried.len(), 2);
            }
            other => panic!("expected MissingSplit, got {other:?}"),
        }
    }

    #[test]
    fn test_open_dimension_mismatch() {
        let dir = TempDir::new().unwrap();
        write_vectors(&dir.path().join("ds_train.bin"), &[vec![1.0f32, 2.0]]).unwrap();
        write_vectors(&dir.path().join("ds_query.bin"), &[vec![1.0f32]]).unwrap();
        assert!(matches!(
            Dataset::open(dir.path(), "ds"),
            Err(DatasetError::DimensionMismatch { base: 2, query: 1 })
        ));
    }
}
