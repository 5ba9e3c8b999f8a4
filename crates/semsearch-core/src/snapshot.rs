//! Snapshot codec and the atomic two-file swap protocol.
//!
//! `catalog.snap` carries `SnapshotData` via `bincode`; `vectors.idx` carries
//! a small header (`count: u32`, `dimension: u32`, both little-endian)
//! followed by the flattened row-major `f32` buffer, mirroring the
//! length-prefixed binary layout `aagt_qmd::vector_store::VectorStore::save`
//! writes with `bincode`.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::index::IndexCore;
use crate::model::ProductRecord;
use crate::vector_index::VectorIndex;

const CATALOG_FILE: &str = "catalog.snap";
const VECTORS_FILE: &str = "vectors.idx";
const VECTOR_HEADER_LEN: usize = 8;
const TORN_PAIR_RETRY_DELAY: Duration = Duration::from_millis(20);

/// The auxiliary tables persisted in `catalog.snap` (the vector index itself
/// lives in the sibling `vectors.idx` file).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotData {
    pub products: BTreeMap<i64, ProductRecord>,
    pub corpus: BTreeMap<i64, String>,
    pub id_to_slot: HashMap<i64, usize>,
    pub slot_to_id: HashMap<usize, i64>,
    pub next_slot: usize,
    pub timestamp: DateTime<Utc>,
}

impl SnapshotData {
    /// Validates the cross-map cardinality invariant.
    pub fn cardinality_consistent(&self, vector_count: usize) -> bool {
        self.products.len() == self.corpus.len()
            && self.products.len() == self.id_to_slot.len()
            && self.products.len() == self.slot_to_id.len()
            && self.products.len() == vector_count
    }
}

/// Points at the directory holding the `catalog.snap` / `vectors.idx` pair.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
    dimension: usize,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>, dimension: usize) -> Self {
        Self {
            dir: dir.into(),
            dimension,
        }
    }

    fn catalog_path(&self) -> PathBuf {
        self.dir.join(CATALOG_FILE)
    }

    fn vectors_path(&self) -> PathBuf {
        self.dir.join(VECTORS_FILE)
    }

    /// Loads the current snapshot pair into an `IndexCore`.
    ///
    /// Returns `Error::Unavailable` if neither file exists yet (first boot).
    /// A torn pair (the cardinality invariant fails, e.g. because a save is
    /// concurrently mid-rename) is retried once after a short delay; if it
    /// is still torn, returns `Error::Conflict` without swapping.
    pub fn load(&self) -> Result<(IndexCore, DateTime<Utc>)> {
        match self.try_load_once() {
            Err(Error::Conflict(_)) => {
                thread::sleep(TORN_PAIR_RETRY_DELAY);
                self.try_load_once()
            }
            other => other,
        }
    }

    fn try_load_once(&self) -> Result<(IndexCore, DateTime<Utc>)> {
        let catalog_path = self.catalog_path();
        let vectors_path = self.vectors_path();

        if !catalog_path.exists() && !vectors_path.exists() {
            return Err(Error::Unavailable(
                "no snapshot present yet (first boot)".to_string(),
            ));
        }

        let catalog_bytes = fs::read(&catalog_path)?;
        let data: SnapshotData = bincode::deserialize(&catalog_bytes)?;

        let vector_bytes = fs::read(&vectors_path)?;
        let vec_index = decode_vectors(&vector_bytes)?;

        if !data.cardinality_consistent(vec_index.len()) {
            return Err(Error::Conflict(format!(
                "torn snapshot: products={} vectors={}",
                data.products.len(),
                vec_index.len()
            )));
        }

        let timestamp = data.timestamp;
        let core = IndexCore::from_parts(
            data.products,
            data.corpus,
            data.id_to_slot,
            data.slot_to_id,
            data.next_slot,
            vec_index,
        );
        Ok((core, timestamp))
    }

    /// Saves `core` as the new snapshot, following the tmp-write /
    /// rename-to-old / rename-into-place protocol.
    pub fn save(&self, core: &IndexCore, timestamp: DateTime<Utc>) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let data = SnapshotData {
            products: core.products().clone(),
            corpus: core.corpus().clone(),
            id_to_slot: core.id_to_slot().clone(),
            slot_to_id: core.slot_to_id().clone(),
            next_slot: core.next_slot(),
            timestamp,
        };

        let catalog_tmp = with_suffix(&self.catalog_path(), "tmp");
        let vectors_tmp = with_suffix(&self.vectors_path(), "tmp");

        fs::write(&catalog_tmp, bincode::serialize(&data)?)?;
        fs::write(&vectors_tmp, encode_vectors(core.vector_index()))?;

        rename_to_old_if_exists(&self.catalog_path())?;
        rename_to_old_if_exists(&self.vectors_path())?;

        fs::rename(&catalog_tmp, self.catalog_path())?;
        fs::rename(&vectors_tmp, self.vectors_path())?;

        Ok(())
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".");
    s.push(suffix);
    PathBuf::from(s)
}

fn rename_to_old_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::rename(path, with_suffix(path, "old"))?;
    }
    Ok(())
}

fn encode_vectors(index: &VectorIndex) -> Vec<u8> {
    let rows = index.as_flat_slice();
    let count = index.len() as u32;
    let dimension = index.dimension() as u32;

    let mut buf = Vec::with_capacity(VECTOR_HEADER_LEN + rows.len() * 4);
    buf.extend_from_slice(&count.to_le_bytes());
    buf.extend_from_slice(&dimension.to_le_bytes());
    for v in rows {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    buf
}

fn decode_vectors(bytes: &[u8]) -> Result<VectorIndex> {
    if bytes.len() < VECTOR_HEADER_LEN {
        return Err(Error::Internal("vectors.idx header truncated".to_string()));
    }
    let count = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
    let dimension = u32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize;

    let expected_len = VECTOR_HEADER_LEN + count * dimension * 4;
    if bytes.len() != expected_len {
        return Err(Error::Internal(format!(
            "vectors.idx length {} does not match header (count={count}, dimension={dimension})",
            bytes.len()
        )));
    }

    let mut rows = Vec::with_capacity(count * dimension);
    for chunk in bytes[VECTOR_HEADER_LEN..].chunks_exact(4) {
        rows.push(f32::from_le_bytes(chunk.try_into().unwrap()));
    }
    VectorIndex::from_rows(dimension, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProductRecord;

    fn sample_data() -> SnapshotData {
        let mut products = BTreeMap::new();
        products.insert(
            1,
            ProductRecord {
                id: 1,
                parent_id: 0,
                active: true,
                name: "Phone".to_string(),
                description: "AMOLED".to_string(),
                variant_combo: String::new(),
            },
        );
        let mut corpus = BTreeMap::new();
        corpus.insert(1, "Phone AMOLED".to_string());
        let mut id_to_slot = HashMap::new();
        id_to_slot.insert(1, 0);
        let mut slot_to_id = HashMap::new();
        slot_to_id.insert(0, 1);

        SnapshotData {
            products,
            corpus,
            id_to_slot,
            slot_to_id,
            next_slot: 1,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn cardinality_consistent_detects_mismatch() {
        let data = sample_data();
        assert!(data.cardinality_consistent(1));
        assert!(!data.cardinality_consistent(2));
    }

    #[test]
    fn vector_round_trip() {
        let mut idx = VectorIndex::new(3);
        idx.push(&[1.0, 2.0, 3.0]).unwrap();
        idx.push(&[4.0, 5.0, 6.0]).unwrap();

        let bytes = encode_vectors(&idx);
        let decoded = decode_vectors(&bytes).unwrap();

        assert_eq!(decoded.dimension(), 3);
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.get(0), Some([1.0, 2.0, 3.0].as_slice()));
        assert_eq!(decoded.get(1), Some([4.0, 5.0, 6.0].as_slice()));
    }

    #[test]
    fn missing_pair_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path(), 3);
        let err = store.load().unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path(), 3);

        let data = sample_data();
        let mut idx = VectorIndex::new(3);
        idx.push(&[0.1, 0.2, 0.3]).unwrap();
        let core = IndexCore::from_parts(
            data.products.clone(),
            data.corpus.clone(),
            data.id_to_slot.clone(),
            data.slot_to_id.clone(),
            data.next_slot,
            idx,
        );

        store.save(&core, data.timestamp).unwrap();
        let (loaded, timestamp) = store.load().unwrap();

        assert_eq!(loaded.products(), core.products());
        assert_eq!(timestamp, data.timestamp);
        assert!(dir.path().join(CATALOG_FILE).exists());
        assert!(dir.path().join(VECTORS_FILE).exists());
    }

    #[test]
    fn second_save_produces_old_backups() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path(), 3);
        let core = IndexCore::new(3);

        store.save(&core, Utc::now()).unwrap();
        store.save(&core, Utc::now()).unwrap();

        assert!(dir.path().join(format!("{CATALOG_FILE}.old")).exists());
        assert!(dir.path().join(format!("{VECTORS_FILE}.old")).exists());
    }

    #[test]
    fn torn_pair_surfaces_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path(), 3);
        let core = IndexCore::new(3);
        store.save(&core, Utc::now()).unwrap();

        // Corrupt vectors.idx so its count disagrees with catalog.snap.
        let bogus = encode_vectors(&{
            let mut v = VectorIndex::new(3);
            v.push(&[1.0, 0.0, 0.0]).unwrap();
            v
        });
        fs::write(dir.path().join(VECTORS_FILE), bogus).unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn torn_pair_that_heals_within_the_retry_delay_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path(), 3);
        let core = IndexCore::new(3);
        store.save(&core, Utc::now()).unwrap();

        let bogus = encode_vectors(&{
            let mut v = VectorIndex::new(3);
            v.push(&[1.0, 0.0, 0.0]).unwrap();
            v
        });
        fs::write(dir.path().join(VECTORS_FILE), bogus).unwrap();

        let healed_path = dir.path().join(VECTORS_FILE);
        thread::spawn(move || {
            thread::sleep(TORN_PAIR_RETRY_DELAY / 2);
            fs::write(healed_path, encode_vectors(&VectorIndex::new(3))).unwrap();
        });

        let (loaded, _timestamp) = store.load().unwrap();
        assert_eq!(loaded.len(), 0);
    }
}
