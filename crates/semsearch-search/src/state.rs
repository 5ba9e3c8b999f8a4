//! Double-buffered process-wide service object for Search: an active tuple
//! serving reads behind a short read lock, and a reload task that loads a
//! fresh tuple and swaps it in under that lock.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{error, info};

use semsearch_core::{Embedder, Error, IndexCore, Result, SnapshotStore};

use crate::config::Config;

pub struct SearchState {
    /// Short read lock over the active tuple. `parking_lot::RwLock` is used
    /// because the critical section is pointer capture only, never I/O.
    active: RwLock<Arc<IndexCore>>,
    /// Serializes reload tasks end to end so at most one loading tuple
    /// exists at a time; held across the snapshot file I/O, so this is a
    /// `tokio::sync::Mutex` rather than `parking_lot`'s.
    reload_lock: AsyncMutex<()>,
    snapshot: SnapshotStore,
    embedder: Arc<dyn Embedder>,
    pub semantic_threshold_default: f32,
    pub hybrid_threshold_default: f32,
}

impl SearchState {
    pub fn new(config: &Config, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let snapshot = SnapshotStore::new(&config.snapshot_dir, config.dimension);
        let core = match snapshot.load() {
            Ok((core, _)) => core,
            Err(Error::Unavailable(msg)) => {
                info!("starting with an empty index: {msg}");
                IndexCore::new(config.dimension)
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            active: RwLock::new(Arc::new(core)),
            reload_lock: AsyncMutex::new(()),
            snapshot,
            embedder,
            semantic_threshold_default: config.semantic_threshold_default,
            hybrid_threshold_default: config.hybrid_threshold_default,
        })
    }

    /// Captures a reference to the currently active index. The caller reads
    /// through this `Arc` without holding any lock further than this call.
    pub fn active(&self) -> Arc<IndexCore> {
        self.active.read().clone()
    }

    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embedder.embed(text).await
    }

    /// Loads the current snapshot (validated inside `SnapshotStore::load`)
    /// and swaps it in under the write lock. On a torn snapshot the active
    /// tuple is left untouched and the failure is only logged — Search keeps
    /// serving the last good index rather than stopping.
    pub async fn reload(&self) {
        let _guard = self.reload_lock.lock().await;
        match self.snapshot.load() {
            Ok((loaded, _timestamp)) => {
                let mut w = self.active.write();
                *w = Arc::new(loaded);
                info!("reload succeeded, active index now has {} products", w.len());
            }
            Err(e) => {
                error!("reload failed, keeping prior active index: {e}");
            }
        }
    }
}
