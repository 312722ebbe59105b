//! Dataset descriptors, benchmark records, and relevance judgments.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Static descriptor for a retrieval dataset.
///
/// Created once when the dataset catalog is defined and shared (via `Arc`)
/// with every `RetrievalDataset` built from it. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMeta {
    /// Directory name under the data root (e.g., "scifact").
    pub dataset_name: String,
    /// Grouping tag used when reporting results (e.g., "science", "legal").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Where the dataset comes from (paper, homepage, hub page).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl DatasetMeta {
    /// Descriptor with only a name; every optional field left empty.
    pub fn new(dataset_name: impl Into<String>) -> Self {
        Self {
            dataset_name: dataset_name.into(),
            category: None,
            display_name: None,
            description: None,
            reference: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// A single corpus document or query.
///
/// `id` is unique within its container. Fields other than `id` and `text`
/// (titles, sources, ...) are preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub text: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Record {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            extra: BTreeMap::new(),
        }
    }
}

/// Graded relevance judgments: `relevance[query_id][corpus_id] = score`.
pub type RelevanceMap = HashMap<String, HashMap<String, f64>>;
