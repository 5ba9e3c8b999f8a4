//! The product record and the pure functions derived from it.

use serde::{Deserialize, Serialize};

/// A single product as returned by the catalog database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: i64,
    pub parent_id: i64,
    pub active: bool,
    pub name: String,
    pub description: String,
    /// Human-readable flattening of a structured attribute list; the
    /// catalog adapter is responsible for producing this already flattened.
    pub variant_combo: String,
}

/// `text(p) = trim(join(" ", p.name, p.description, p.variant_combo))`.
///
/// Pure function of the product record; callers re-derive it on every
/// embed, they never cache it anywhere but `corpus`.
pub fn corpus_text(p: &ProductRecord) -> String {
    format!("{} {} {}", p.name, p.description, p.variant_combo)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, description: &str, variant_combo: &str) -> ProductRecord {
        ProductRecord {
            id: 1,
            parent_id: 0,
            active: true,
            name: name.to_string(),
            description: description.to_string(),
            variant_combo: variant_combo.to_string(),
        }
    }

    #[test]
    fn joins_fields_with_single_space() {
        let p = product("Phone", "AMOLED screen", "color: black");
        assert_eq!(corpus_text(&p), "Phone AMOLED screen color: black");
    }

    #[test]
    fn trims_leading_and_trailing_whitespace_only() {
        let p = product("  Phone", "AMOLED", "black  ");
        assert_eq!(corpus_text(&p), "Phone AMOLED black");
    }

    #[test]
    fn empty_middle_field_preserves_the_double_space_around_it() {
        let p = product("Phone", "", "black");
        assert_eq!(corpus_text(&p), "Phone  black");
    }

    #[test]
    fn all_empty_fields_yield_empty_string() {
        let p = product("", "", "");
        assert_eq!(corpus_text(&p), "");
    }
}
