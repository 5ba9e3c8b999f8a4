//! An in-memory stand-in for the catalog database.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use semsearch_core::{Catalog, ProductRecord, Result};

/// Holds product records in memory, keyed by id.
///
/// `fetch` returns `None` both for an absent id and for an inactive record —
/// a query returns either a product record with `active == true`, or
/// nothing.
#[derive(Default)]
pub struct InMemoryCatalog {
    records: RwLock<HashMap<i64, ProductRecord>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record, regardless of `active`.
    pub async fn upsert(&self, product: ProductRecord) {
        self.records.write().await.insert(product.id, product);
    }

    pub async fn remove(&self, id: i64) {
        self.records.write().await.remove(&id);
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn fetch(&self, id: i64) -> Result<Option<ProductRecord>> {
        let guard = self.records.read().await;
        Ok(guard.get(&id).filter(|p| p.active).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, active: bool) -> ProductRecord {
        ProductRecord {
            id,
            parent_id: 0,
            active,
            name: "Phone".to_string(),
            description: "AMOLED".to_string(),
            variant_combo: String::new(),
        }
    }

    #[tokio::test]
    async fn fetch_absent_id_returns_none() {
        let catalog = InMemoryCatalog::new();
        assert_eq!(catalog.fetch(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn fetch_inactive_record_returns_none() {
        let catalog = InMemoryCatalog::new();
        catalog.upsert(product(1, false)).await;
        assert_eq!(catalog.fetch(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn fetch_active_record_returns_it() {
        let catalog = InMemoryCatalog::new();
        catalog.upsert(product(1, true)).await;
        assert_eq!(catalog.fetch(1).await.unwrap().map(|p| p.id), Some(1));
    }

    #[tokio::test]
    async fn remove_makes_subsequent_fetch_none() {
        let catalog = InMemoryCatalog::new();
        catalog.upsert(product(1, true)).await;
        catalog.remove(1).await;
        assert_eq!(catalog.fetch(1).await.unwrap(), None);
    }
}
