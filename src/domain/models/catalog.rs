//! Value-index domain types: collection entries and similarity matches.

use serde::{Deserialize, Serialize};

/// One (id, document, vector) triple stored in a collection.
///
/// Ids are deterministic: `{collection}_{position}` over the ordered,
/// deduplicated value set, so an unchanged source rebuilds to identical ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub id: String,
    pub document: String,
    pub vector: Vec<f32>,
}

impl CollectionEntry {
    /// Entry at a given position in a collection's value ordering.
    pub fn at_position(
        collection: &str,
        position: usize,
        document: impl Into<String>,
        vector: Vec<f32>,
    ) -> Self {
        Self {
            id: format!("{collection}_{position}"),
            document: document.into(),
            vector,
        }
    }
}

/// A categorical value matched by similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatch {
    /// The exact stored value
    pub value: String,

    /// `1 - cosine distance`; higher is closer
    pub similarity: f32,
}

impl SimilarityMatch {
    /// Render as the quoted form the generation prompt consumes,
    /// e.g. `'Iluminação Pública' (sim: 0.812)`.
    pub fn render(&self) -> String {
        format!("'{}' (sim: {:.3})", self.value, self.similarity)
    }
}
