//! Data model, index core, snapshot codec, and ranking for the semantic
//! product search service.
//!
//! This crate is transport-free: HTTP framing, logging setup, and
//! configuration loading live in the `semsearch-updater` and
//! `semsearch-search` binaries. `semsearch-adapters` supplies the
//! `Embedder`/`Catalog` implementations the index core calls through the
//! traits defined here.

pub mod error;
pub mod index;
pub mod logging;
pub mod model;
pub mod search;
pub mod snapshot;
pub mod traits;
pub mod vector_index;

pub use error::{Error, Result};
pub use index::{IndexCore, MutationKind};
pub use model::{corpus_text, ProductRecord};
pub use search::{hybrid_search, semantic_search, ScoredId};
pub use snapshot::{SnapshotData, SnapshotStore};
pub use traits::{Catalog, Embedder};
pub use vector_index::VectorIndex;
