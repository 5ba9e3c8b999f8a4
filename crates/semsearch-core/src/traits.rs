//! Interfaces over the two external collaborators the index core depends on.
//!
//! The embedding model and the catalog database are genuinely external
//! systems; the index core only needs the single method each exposes here.
//! `semsearch-adapters` provides the fakes used by tests and by the binaries
//! until a real model/DB is wired in, mirroring
//! `aagt_core::agent::provider::Provider`'s trait-plus-mock shape.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::ProductRecord;

/// Maps text to a unit-norm embedding vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds a single string. The returned vector has length `dimension()`
    /// and unit L2 norm.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embeds a batch of strings in order, used by rebuild.
    ///
    /// The default implementation embeds one at a time; implementations
    /// backed by a real model should override this for batching.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for t in texts {
            out.push(self.embed(t).await?);
        }
        Ok(out)
    }

    /// Dimensionality of vectors this embedder produces.
    fn dimension(&self) -> usize;
}

/// Looks up a product record by id in the catalog database.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Returns `Ok(None)` when the catalog has no record for `id`, or the
    /// record is present but inactive — callers treat both the same way.
    async fn fetch(&self, id: i64) -> Result<Option<ProductRecord>>;
}
