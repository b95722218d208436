//! Filter conversion and local evaluation.
//!
//! Currently supports exact equality on scalar fields; unsupported value
//! types are skipped rather than rejected.

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::record::MetadataFilter;

/// Converts a [`MetadataFilter`] to the remote index's JSON filter syntax:
/// `{"field": {"$eq": value}, ...}`.
pub fn to_index_filter(f: &MetadataFilter) -> Value {
    debug!("filters::to_index_filter equals={}", f.equals.len());

    let mut obj = Map::new();
    for (field, val) in &f.equals {
        match val {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                obj.insert(field.clone(), json!({ "$eq": val }));
            }
            _ => continue, // skip unsupported types
        }
    }
    Value::Object(obj)
}

/// Applies the same equality predicate against a record's metadata,
/// for the local fallback path.
///
/// A record without the field does not match an equality clause on it.
pub fn matches_metadata(f: &MetadataFilter, metadata: &Map<String, Value>) -> bool {
    f.equals.iter().all(|(field, want)| {
        matches!(want, Value::String(_) | Value::Number(_) | Value::Bool(_))
            && metadata.get(field) == Some(want)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn index_filter_shape() {
        let f = MetadataFilter::equals("pii", false);
        assert_eq!(to_index_filter(&f), json!({ "pii": { "$eq": false } }));
    }

    #[test]
    fn skips_unsupported_values() {
        let f = MetadataFilter {
            equals: vec![("tags".into(), json!(["a", "b"])), ("pii".into(), json!(false))],
        };
        assert_eq!(to_index_filter(&f), json!({ "pii": { "$eq": false } }));
    }

    #[test]
    fn local_equality() {
        let f = MetadataFilter::equals("pii", false);
        let mut md = Map::new();
        md.insert("pii".into(), json!(false));
        assert!(matches_metadata(&f, &md));

        md.insert("pii".into(), json!(true));
        assert!(!matches_metadata(&f, &md));

        // missing field never matches
        md.remove("pii");
        assert!(!matches_metadata(&f, &md));
    }
}
