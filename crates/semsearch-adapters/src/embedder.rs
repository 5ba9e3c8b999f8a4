//! A deterministic, dependency-free stand-in for the real embedding model.
//!
//! The embedding model is an external collaborator specified only by the
//! interface it exposes; this fake satisfies that interface without pulling
//! in a model runtime, the way `aagt_providers::mock` fakes out `Provider`
//! for tests.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use semsearch_core::{Embedder, Result};

/// Dimensionality the Search and Updater services default to.
pub const DEFAULT_DIMENSION: usize = 768;

/// Hashes the input text into a unit-norm vector of `dimension()` floats.
///
/// Deterministic: the same text always embeds to the same vector, so tests
/// can reason about similarity without a real model. Not semantically
/// meaningful — two unrelated strings sharing no characters will not reliably
/// score low, and vice versa — callers that need semantic behavior in tests
/// should shape inputs so the expected ranking follows from shared
/// substrings, not from embedding proximity.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; self.dimension];
        let mut counter: u32 = 0;
        let mut written = 0;

        while written < self.dimension {
            let mut hasher = Sha256::new();
            hasher.update(text.as_bytes());
            hasher.update(counter.to_le_bytes());
            let digest = hasher.finalize();

            for chunk in digest.chunks_exact(4) {
                if written >= self.dimension {
                    break;
                }
                let bits = u32::from_le_bytes(chunk.try_into().unwrap());
                // Map to [-1.0, 1.0) without ever producing all-zero output.
                v[written] = (bits as f32 / u32::MAX as f32) * 2.0 - 1.0;
                written += 1;
            }
            counter += 1;
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        Ok(v)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
