//! Semantic and hybrid ranking over an `IndexCore`.

use crate::index::IndexCore;

/// One ranked result: a product id plus its similarity score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredId {
    pub id: i64,
    pub score: f32,
}

/// Scores every vector in `core` against `query_vector`, keeps those scoring
/// at or above `threshold`, and sorts descending by score with ties broken
/// by ascending product id.
///
/// `query_vector` must already be the embedding of the caller's query text;
/// callers own the embedding call since it may be async.
pub fn semantic_search(core: &IndexCore, query_vector: &[f32], threshold: f32) -> Vec<ScoredId> {
    if core.vector_index().is_empty() {
        return Vec::new();
    }

    let mut results: Vec<ScoredId> = core
        .vector_index()
        .score_all(query_vector)
        .into_iter()
        .filter_map(|(slot, score)| {
            let id = *core.slot_to_id().get(&slot)?;
            (score >= threshold).then_some(ScoredId { id, score })
        })
        .collect();

    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    results
}

/// Runs `semantic_search` then augments with literal substring matches
/// against `description` and `variant_combo`, forced to score `1.0` and
/// prepended ahead of every semantic-only result.
pub fn hybrid_search(core: &IndexCore, query: &str, query_vector: &[f32], threshold: f32) -> Vec<ScoredId> {
    let semantic = semantic_search(core, query_vector, threshold);
    let mut seen: std::collections::HashSet<i64> = semantic.iter().map(|r| r.id).collect();

    let needle = query.to_lowercase();
    let mut substring_hits = Vec::new();
    for (id, p) in core.products() {
        if seen.contains(id) {
            continue;
        }
        let hay = format!(
            "{}{}",
            p.description.to_lowercase(),
            p.variant_combo.to_lowercase()
        );
        if hay.contains(&needle) {
            substring_hits.push(ScoredId {
                id: *id,
                score: 1.0,
            });
            seen.insert(*id);
        }
    }

    let mut combined = substring_hits;
    combined.extend(semantic);
    combined.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProductRecord;
    use crate::vector_index::VectorIndex;
    use std::collections::{BTreeMap, HashMap};

    fn product(id: i64, description: &str, variant_combo: &str) -> ProductRecord {
        ProductRecord {
            id,
            parent_id: 0,
            active: true,
            name: String::new(),
            description: description.to_string(),
            variant_combo: variant_combo.to_string(),
        }
    }

    fn core_with(products: Vec<(ProductRecord, [f32; 2])>) -> IndexCore {
        let mut p_map = BTreeMap::new();
        let mut corpus = BTreeMap::new();
        let mut id_to_slot = HashMap::new();
        let mut slot_to_id = HashMap::new();
        let mut vec_index = VectorIndex::new(2);

        for (slot, (p, v)) in products.into_iter().enumerate() {
            let id = p.id;
            corpus.insert(id, p.description.clone());
            id_to_slot.insert(id, slot);
            slot_to_id.insert(slot, id);
            vec_index.push(&v).unwrap();
            p_map.insert(id, p);
        }

        IndexCore::from_parts(p_map, corpus, id_to_slot, slot_to_id, vec_index.len(), vec_index)
    }

    #[test]
    fn empty_index_returns_no_results() {
        let core = IndexCore::new(2);
        assert!(semantic_search(&core, &[1.0, 0.0], 0.3).is_empty());
    }

    #[test]
    fn filters_by_threshold_and_sorts_desc_score_asc_id() {
        let core = core_with(vec![
            (product(2, "b", ""), [1.0, 0.0]),
            (product(1, "a", ""), [0.9, 0.436]),
        ]);

        let results = semantic_search(&core, &[1.0, 0.0], 0.5);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, 2);
        assert_eq!(results[1].id, 1);
    }

    #[test]
    fn threshold_above_one_returns_empty() {
        let core = core_with(vec![(product(1, "a", ""), [1.0, 0.0])]);
        assert!(semantic_search(&core, &[1.0, 0.0], 1.01).is_empty());
    }

    #[test]
    fn threshold_below_negative_one_returns_all() {
        let core = core_with(vec![
            (product(1, "a", ""), [1.0, 0.0]),
            (product(2, "b", ""), [-1.0, 0.0]),
        ]);
        let results = semantic_search(&core, &[1.0, 0.0], -1.01);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn hybrid_search_forces_substring_hits_to_one() {
        let core = core_with(vec![
            (product(101, "AMOLED screen", "color: black"), [1.0, 0.0]),
            (product(102, "amoled panel", ""), [0.0, 1.0]),
        ]);

        let results = hybrid_search(&core, "amoled", &[0.0, 1.0], 0.9);
        let ids: Vec<i64> = results.iter().map(|r| r.id).collect();
        assert!(ids.contains(&101));
        assert!(ids.contains(&102));
        for r in &results {
            if r.id == 101 {
                assert_eq!(r.score, 1.0);
            }
        }
    }

    #[test]
    fn hybrid_search_does_not_duplicate_ids_already_in_semantic_results() {
        let core = core_with(vec![(product(101, "amoled screen", ""), [1.0, 0.0])]);
        let results = hybrid_search(&core, "amoled", &[1.0, 0.0], 0.1);
        assert_eq!(results.iter().filter(|r| r.id == 101).count(), 1);
    }

    #[test]
    fn hybrid_search_on_empty_products_is_empty() {
        let core = IndexCore::new(2);
        let results = hybrid_search(&core, "anything", &[1.0, 0.0], 0.45);
        assert!(results.is_empty());
    }
}
