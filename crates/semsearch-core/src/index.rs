//! The index core: in-memory maps plus the vector index, and the
//! add/modify/delete/rebuild algorithm that keeps them consistent.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};
use crate::model::{corpus_text, ProductRecord};
use crate::traits::{Catalog, Embedder};
use crate::vector_index::VectorIndex;

/// Owns the product catalog mirror, the corpus text used to derive each
/// embedding, the bidirectional id/slot mapping, and the vector index.
///
/// Not internally synchronized — the Updater service wraps one instance in
/// a `std::sync::Mutex` and serializes every mutation through it.
#[derive(Debug, Clone)]
pub struct IndexCore {
    /// Authoritative record per indexed product. A `BTreeMap` keyed by id
    /// gives ascending-id iteration for free, which rebuild relies on.
    products: BTreeMap<i64, ProductRecord>,
    /// Last text used to generate each product's embedding.
    corpus: BTreeMap<i64, String>,
    id_to_slot: HashMap<i64, usize>,
    slot_to_id: HashMap<usize, i64>,
    next_slot: usize,
    vec_index: VectorIndex,
}

/// Outcome of a mutation, for the Updater to log and report in `/stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Added,
    Modified,
    Deleted,
}

impl IndexCore {
    /// An empty core for vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            products: BTreeMap::new(),
            corpus: BTreeMap::new(),
            id_to_slot: HashMap::new(),
            slot_to_id: HashMap::new(),
            next_slot: 0,
            vec_index: VectorIndex::new(dimension),
        }
    }

    /// Reassembles a core from its constituent parts, as produced by the
    /// snapshot codec. Callers are responsible for the cardinality check;
    /// this constructor does not re-validate it.
    pub fn from_parts(
        products: BTreeMap<i64, ProductRecord>,
        corpus: BTreeMap<i64, String>,
        id_to_slot: HashMap<i64, usize>,
        slot_to_id: HashMap<usize, i64>,
        next_slot: usize,
        vec_index: VectorIndex,
    ) -> Self {
        Self {
            products,
            corpus,
            id_to_slot,
            slot_to_id,
            next_slot,
            vec_index,
        }
    }

    pub fn products(&self) -> &BTreeMap<i64, ProductRecord> {
        &self.products
    }

    pub fn corpus(&self) -> &BTreeMap<i64, String> {
        &self.corpus
    }

    pub fn id_to_slot(&self) -> &HashMap<i64, usize> {
        &self.id_to_slot
    }

    pub fn slot_to_id(&self) -> &HashMap<usize, i64> {
        &self.slot_to_id
    }

    pub fn next_slot(&self) -> usize {
        self.next_slot
    }

    pub fn vector_index(&self) -> &VectorIndex {
        &self.vec_index
    }

    pub fn get(&self, id: i64) -> Option<&ProductRecord> {
        self.products.get(&id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Fetches `id` from the catalog and indexes it. Falls through to
    /// `modify` if the id is already present.
    pub async fn add(
        &mut self,
        id: i64,
        catalog: &dyn Catalog,
        embedder: &dyn Embedder,
    ) -> Result<MutationKind> {
        let p = catalog
            .fetch(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("product {id} not found or inactive")))?;

        if self.products.contains_key(&id) {
            return self.modify(id, catalog, embedder).await;
        }

        let t = corpus_text(&p);
        let v = embedder.embed(&t).await?;
        let slot = self.vec_index.push(&v)?;

        self.products.insert(id, p);
        self.corpus.insert(id, t);
        self.id_to_slot.insert(id, slot);
        self.slot_to_id.insert(slot, id);
        self.next_slot += 1;

        Ok(MutationKind::Added)
    }

    /// Re-fetches `id` and re-embeds it. Falls through to `add` if the id
    /// isn't indexed yet, or to `delete` if the catalog no longer has it.
    pub async fn modify(
        &mut self,
        id: i64,
        catalog: &dyn Catalog,
        embedder: &dyn Embedder,
    ) -> Result<MutationKind> {
        if !self.products.contains_key(&id) {
            return self.add(id, catalog, embedder).await;
        }

        let fetched = catalog.fetch(id).await?;
        let p = match fetched {
            Some(p) => p,
            None => return self.delete(id, embedder).await,
        };

        let t = corpus_text(&p);
        self.products.insert(id, p);
        self.corpus.insert(id, t);
        self.rebuild(embedder).await?;

        Ok(MutationKind::Modified)
    }

    /// Removes `id` from every map and rebuilds the vector index. Idempotent:
    /// deleting an absent id succeeds without changing anything.
    pub async fn delete(&mut self, id: i64, embedder: &dyn Embedder) -> Result<MutationKind> {
        if !self.products.contains_key(&id) {
            return Ok(MutationKind::Deleted);
        }

        self.products.remove(&id);
        self.corpus.remove(&id);
        if let Some(slot) = self.id_to_slot.remove(&id) {
            self.slot_to_id.remove(&slot);
        }
        self.rebuild(embedder).await?;

        Ok(MutationKind::Deleted)
    }

    /// Reconstructs the vector index and both slot mappings from `corpus`,
    /// enumerated in ascending product-id order.
    async fn rebuild(&mut self, embedder: &dyn Embedder) -> Result<()> {
        if self.corpus.is_empty() {
            self.vec_index = VectorIndex::new(self.vec_index.dimension());
            self.id_to_slot.clear();
            self.slot_to_id.clear();
            self.next_slot = 0;
            return Ok(());
        }

        self.id_to_slot.clear();
        self.slot_to_id.clear();

        let ids: Vec<i64> = self.corpus.keys().copied().collect();
        let texts: Vec<String> = ids.iter().map(|id| self.corpus[id].clone()).collect();

        for (slot, id) in ids.iter().enumerate() {
            self.id_to_slot.insert(*id, slot);
            self.slot_to_id.insert(slot, *id);
        }

        let vectors = embedder.embed_batch(&texts).await?;
        let mut fresh = VectorIndex::new(embedder.dimension());
        for v in &vectors {
            fresh.push(v)?;
        }

        self.next_slot = ids.len();
        self.vec_index = fresh;
        Ok(())
    }
}
