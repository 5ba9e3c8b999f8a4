//! Process-wide service object for the Updater: a single owned struct
//! created at startup and threaded through handler closures, no process
//! globals.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use semsearch_core::{Catalog, Embedder, Error, IndexCore, MutationKind, Result, SnapshotStore};

use crate::config::Config;

#[derive(Debug, Clone, Copy)]
enum Operation {
    Add,
    Modify,
    Delete,
}

/// One mutex covering the entire index core: mutations are serialized end
/// to end, including the catalog/embedder calls the mutation makes, so a
/// `tokio::sync::Mutex` is used rather than `std::sync::Mutex` — the guard
/// must survive the `.await` points inside `IndexCore::add`/`modify`/
/// `delete`.
pub struct UpdaterState {
    core: Mutex<IndexCore>,
    catalog: Arc<dyn Catalog>,
    embedder: Arc<dyn Embedder>,
    snapshot: SnapshotStore,
    http: reqwest::Client,
    search_base_url: String,
}

impl UpdaterState {
    pub fn new(
        config: &Config,
        catalog: Arc<dyn Catalog>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let snapshot = SnapshotStore::new(&config.snapshot_dir, config.dimension);
        let core = match snapshot.load() {
            Ok((core, _)) => core,
            Err(Error::Unavailable(msg)) => {
                info!("starting with an empty index: {msg}");
                IndexCore::new(config.dimension)
            }
            Err(e) => return Err(e),
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.notify_timeout_secs))
            .build()
            .map_err(|e| Error::Internal(format!("failed to build http client: {e}")))?;

        Ok(Self {
            core: Mutex::new(core),
            catalog,
            embedder,
            snapshot,
            http,
            search_base_url: config.search_base_url.clone(),
        })
    }

    pub async fn add(&self, id: i64) -> Result<MutationKind> {
        self.mutate(id, Operation::Add).await
    }

    pub async fn modify(&self, id: i64) -> Result<MutationKind> {
        self.mutate(id, Operation::Modify).await
    }

    pub async fn delete(&self, id: i64) -> Result<MutationKind> {
        self.mutate(id, Operation::Delete).await
    }

    /// Runs one mutation under the index-core mutex, then persists the
    /// snapshot and notifies Search.
    async fn mutate(&self, id: i64, op: Operation) -> Result<MutationKind> {
        let mut guard = self.core.lock().await;
        let kind = match op {
            Operation::Add => guard.add(id, self.catalog.as_ref(), self.embedder.as_ref()).await?,
            Operation::Modify => {
                guard
                    .modify(id, self.catalog.as_ref(), self.embedder.as_ref())
                    .await?
            }
            Operation::Delete => guard.delete(id, self.embedder.as_ref()).await?,
        };

        if let Err(save_err) = self.snapshot.save(&guard, Utc::now()) {
            error!("snapshot save failed for product {id}: {save_err}");
            // Roll back in-memory state to the last snapshot that did save
            // successfully. If there is no prior snapshot to roll back to,
            // there is nothing consistent left to serve; restart and
            // resynchronize from the last good state.
            match self.snapshot.load() {
                Ok((restored, _)) => {
                    *guard = restored;
                    drop(guard);
                    return Err(Error::Internal(format!(
                        "snapshot save failed, rolled back to prior snapshot: {save_err}"
                    )));
                }
                Err(_) => {
                    drop(guard);
                    panic!(
                        "snapshot save failed with no prior snapshot to roll back to: {save_err}"
                    );
                }
            }
        }
        drop(guard);

        self.notify(id, kind).await;
        Ok(kind)
    }

    /// Fire-and-forget notification to the Search service. Failures are
    /// logged, never propagated.
    async fn notify(&self, id: i64, kind: MutationKind) {
        let action = match kind {
            MutationKind::Added => "add",
            MutationKind::Modified => "modify",
            MutationKind::Deleted => "delete",
        };
        let url = format!("{}/reload_index", self.search_base_url);
        let payload = serde_json::json!({
            "action": action,
            "product_id": id,
            "timestamp": Utc::now().to_rfc3339(),
        });

        match self.http.post(&url).json(&payload).send().await {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => warn!("notify to {url} returned status {}", resp.status()),
            Err(e) => warn!("notify to {url} failed: {e}"),
        }
    }

    pub async fn stats(&self) -> serde_json::Value {
        let core = self.core.lock().await;
        serde_json::json!({
            "total_productos": core.len(),
            "faiss_total": core.vector_index().len(),
            "next_faiss_idx": core.next_slot(),
            "dimension": core.vector_index().dimension(),
        })
    }

    pub async fn get_product(&self, id: i64) -> Option<semsearch_core::ProductRecord> {
        self.core.lock().await.get(id).cloned()
    }
}
