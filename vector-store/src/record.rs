//! Core data models used by the library.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical record stored in the index (and in the fallback JSONL files).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    /// Embedding vector; its length must match the index dimensionality.
    pub values: Vec<f32>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// A single retrieval hit: similarity score plus the record's metadata.
///
/// The index returns hits pre-sorted by descending score; consumers must
/// not re-sort.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub score: f32,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Exact-equality metadata filter.
///
/// The remote index consumes this as `{"field": {"$eq": value}}` clauses;
/// the local fallback applies the same predicate in-process. Equality on a
/// boolean key is what the clinic namespace uses to exclude records flagged
/// as containing personal data.
#[derive(Clone, Debug, Default)]
pub struct MetadataFilter {
    pub equals: Vec<(String, Value)>,
}

impl MetadataFilter {
    /// A filter with a single equality clause.
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            equals: vec![(field.into(), value.into())],
        }
    }
}
