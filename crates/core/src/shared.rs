//! Thread-safe index handle.
//!
//! A [`SharedIndex`] wraps an [`HnswIndex`] in a reader/writer lock: any number of
//! searches run in parallel under the read lock, while an insertion holds the write
//! lock for its whole duration. A search can therefore never observe a half-wired
//! neighbor list. Cloning produces a new handle to the same index.

use crate::error::Result;
use crate::hnsw::{knn_search, HnswConfig, HnswIndex, Neighbor};
use parking_lot::{RwLock, RwLockReadGuard};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SharedIndex {
    inner: Arc<RwLock<HnswIndex>>,
}

impl SharedIndex {
    /// Creates a new empty shared index.
    pub fn new(dimension: usize, config: HnswConfig) -> Result<Self> {
        Ok(Self::from_index(HnswIndex::new(dimension, config)?))
    }

    pub fn from_index(index: HnswIndex) -> Self {
        Self {
            inner: Arc::new(RwLock::new(index)),
        }
    }

    /// Inserts a vector under the write lock. Returns its id.
    pub fn insert(&self, vector: &[f32]) -> Result<u32> {
        self.inner.write().insert(vector)
    }

    /// KNN search under the read lock.
    pub fn search(&self, query: &[f32], k: usize, ef: usize) -> Result<Vec<Neighbor>> {
        knn_search(&self.inner.read(), query, k, ef)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Read guard for direct access to the graph.
    pub fn read(&self) -> RwLockReadGuard<'_, HnswIndex> {
        self.inner.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::thread;

    fn config() -> HnswConfig {
        HnswConfig {
            seed: Some(5),
            ..HnswConfig::new(8, 64)
        }
    }

    #[test]
    fn test_handles_share_state() {
        let a = SharedIndex::new(2, config()).unwrap();
        let b = a.clone();
        a.insert(&[1.0, 1.0]).unwrap();
        assert_eq!(b.len(), 1);
        assert!(!b.is_empty());
        let hits = b.search(&[1.0, 1.0], 1, 1).unwrap();
        assert_eq!(hits[0].id, 0);
    }

    #[test]
    fn test_concurrent_readers_agree() {
        let shared = SharedIndex::new(4, config()).unwrap();
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..300 {
            let v: Vec<f32> = (0..4).map(|_| rng.gen()).collect();
            shared.insert(&v).unwrap();
        }
        let query = vec![0.5f32; 4];
        let expected = shared.search(&query, 5, 64).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                let query = query.clone();
                thread::spawn(move || shared.search(&query, 5, 64).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }

    #[test]
    fn test_concurrent_writers_serialize() {
        let shared = SharedIndex::new(3, config()).unwrap();
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        shared.insert(&[t as f32, i as f32, 0.0]).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(shared.len(), 200);
        shared.read().validate().unwrap();
    }
}
