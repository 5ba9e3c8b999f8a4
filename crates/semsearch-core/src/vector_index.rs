//! Flat, exact inner-product vector index.
//!
//! Vectors are assumed unit-norm (the embedder's contract), so inner product
//! and cosine similarity coincide. There is no approximate structure here —
//! every search scores every stored vector, unlike
//! `aagt_qmd::vector_store::VectorStore`'s HNSW-backed approximate search;
//! exact scoring is required here, so the index structure diverges while
//! the flat storage and save/load shape still follow the teacher.

use crate::error::{Error, Result};

/// A flat array of row-major `f32` vectors, indexed by contiguous slot.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    dimension: usize,
    rows: Vec<f32>,
}

impl VectorIndex {
    /// Creates an empty index for vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            rows: Vec::new(),
        }
    }

    /// Builds an index from an already-flattened row-major buffer.
    ///
    /// Returns `Error::Internal` if `rows.len()` is not a multiple of
    /// `dimension`.
    pub fn from_rows(dimension: usize, rows: Vec<f32>) -> Result<Self> {
        if dimension == 0 || rows.len() % dimension != 0 {
            return Err(Error::Internal(format!(
                "vector buffer of length {} is not a multiple of dimension {}",
                rows.len(),
                dimension
            )));
        }
        Ok(Self { dimension, rows })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of vectors currently stored.
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.rows.len() / self.dimension
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a vector, returning its newly assigned slot.
    ///
    /// `vector.len()` must equal `dimension()`; callers are expected to
    /// enforce that (the embedder always produces `dimension()`-long output).
    pub fn push(&mut self, vector: &[f32]) -> Result<usize> {
        if vector.len() != self.dimension {
            return Err(Error::Internal(format!(
                "vector of length {} does not match index dimension {}",
                vector.len(),
                self.dimension
            )));
        }
        let slot = self.len();
        self.rows.extend_from_slice(vector);
        Ok(slot)
    }

    /// Returns the vector stored at `slot`, if any.
    pub fn get(&self, slot: usize) -> Option<&[f32]> {
        let start = slot.checked_mul(self.dimension)?;
        let end = start.checked_add(self.dimension)?;
        self.rows.get(start..end)
    }

    /// Scores `query` against every stored vector via inner product.
    ///
    /// Returns `(slot, score)` pairs in slot order, unfiltered and unsorted —
    /// callers apply the threshold and ranking (see `search.rs`).
    pub fn score_all(&self, query: &[f32]) -> Vec<(usize, f32)> {
        if query.len() != self.dimension || self.dimension == 0 {
            return Vec::new();
        }
        self.rows
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(slot, row)| (slot, dot(row, query)))
            .collect()
    }

    /// Row-major flattened buffer, for the snapshot codec.
    pub fn as_flat_slice(&self) -> &[f32] {
        &self.rows
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_assigns_sequential_slots() {
        let mut idx = VectorIndex::new(2);
        assert_eq!(idx.push(&[1.0, 0.0]).unwrap(), 0);
        assert_eq!(idx.push(&[0.0, 1.0]).unwrap(), 1);
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn rejects_wrong_dimension() {
        let mut idx = VectorIndex::new(3);
        assert!(idx.push(&[1.0, 0.0]).is_err());
    }

    #[test]
    fn score_all_computes_dot_product() {
        let mut idx = VectorIndex::new(2);
        idx.push(&[1.0, 0.0]).unwrap();
        idx.push(&[0.0, 1.0]).unwrap();
        idx.push(&[0.7071, 0.7071]).unwrap();

        let scores = idx.score_all(&[1.0, 0.0]);
        assert_eq!(scores.len(), 3);
        assert!((scores[0].1 - 1.0).abs() < 1e-4);
        assert!((scores[1].1 - 0.0).abs() < 1e-4);
        assert!((scores[2].1 - 0.7071).abs() < 1e-3);
    }

    #[test]
    fn score_all_with_mismatched_dimension_returns_empty() {
        let mut idx = VectorIndex::new(2);
        idx.push(&[1.0, 0.0]).unwrap();
        assert!(idx.score_all(&[1.0, 0.0, 0.0]).is_empty());
    }

    #[test]
    fn from_rows_validates_length() {
        assert!(VectorIndex::from_rows(3, vec![1.0, 2.0]).is_err());
        assert!(VectorIndex::from_rows(2, vec![1.0, 2.0, 3.0, 4.0]).is_ok());
    }
}
