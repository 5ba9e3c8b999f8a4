//! `Embedder` and `Catalog` implementations for the semantic product search
//! service, used by both binaries until a real model and database are
//! wired in, and by the test suites of every other crate in the workspace.

pub mod catalog;
pub mod embedder;

pub use catalog::InMemoryCatalog;
pub use embedder::{HashEmbedder, DEFAULT_DIMENSION};
