//! Context extraction and the strict precedence decision.

use serde_json::{Map, Value};
use vector_store::ScoredMatch;

/// Layer names as they appear in `used_layers` and the Sources footer.
pub const LAYER_PATIENT: &str = "Patient Pinecone";
pub const LAYER_CLINIC: &str = "Clinic KB";
pub const LAYER_MANIFEST: &str = "Manifest OCR";

/// Accepted metadata keys carrying displayable text, in preference order.
const TEXT_KEYS: [&str; 5] = ["text", "chunk", "content", "snippet", "body"];

/// Defensive extraction of displayable text from a match's metadata.
///
/// Prefers the `text` field but tolerates the synonyms some ingestion
/// pipelines use. As a last resort, composes a short label from
/// title/source and label fields. Returns an empty string when nothing
/// usable is present; callers drop such matches.
pub fn meta_to_text(metadata: &Map<String, Value>) -> String {
    for key in TEXT_KEYS {
        if let Some(Value::String(s)) = metadata.get(key) {
            let t = s.trim();
            if !t.is_empty() {
                return t.to_string();
            }
        }
    }

    let title = metadata
        .get("title")
        .or_else(|| metadata.get("source"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let label = metadata.get("label").and_then(Value::as_str).unwrap_or_default();
    let pieces: Vec<&str> = [title, label].into_iter().filter(|s| !s.is_empty()).collect();
    pieces.join(" - ").trim().to_string()
}

/// Extracts the usable texts from a result set, dropping matches that
/// contribute nothing. Input order (best-first) is preserved.
pub fn usable_texts(matches: &[ScoredMatch]) -> Vec<String> {
    matches
        .iter()
        .map(|m| meta_to_text(&m.metadata))
        .filter(|t| !t.is_empty())
        .collect()
}

/// The single source that grounds the answer.
///
/// Exactly one tier contributes: patient texts win whenever any exist,
/// clinic texts only when no patient text exists, manifest OCR only when
/// both vector tiers are empty, and `General` means ungrounded fallback.
/// This is a strict override chain, not rank fusion: once a higher tier has
/// content, lower tiers are never mixed in, keeping the Sources attribution
/// unambiguous.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimarySource {
    Patient(Vec<String>),
    Clinic(Vec<String>),
    Manifest(String),
    General,
}

impl PrimarySource {
    /// Layer names actually used, in patient → clinic → manifest order.
    pub fn used_layers(&self) -> Vec<&'static str> {
        match self {
            PrimarySource::Patient(_) => vec![LAYER_PATIENT],
            PrimarySource::Clinic(_) => vec![LAYER_CLINIC],
            PrimarySource::Manifest(_) => vec![LAYER_MANIFEST],
            PrimarySource::General => Vec::new(),
        }
    }
}

/// Resolves the precedence chain over the extracted texts.
pub fn select_source(
    patient_texts: Vec<String>,
    clinic_texts: Vec<String>,
    manifest_text: String,
) -> PrimarySource {
    if !patient_texts.is_empty() {
        PrimarySource::Patient(patient_texts)
    } else if !clinic_texts.is_empty() {
        PrimarySource::Clinic(clinic_texts)
    } else if !manifest_text.is_empty() {
        PrimarySource::Manifest(manifest_text)
    } else {
        PrimarySource::General
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn md(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs.iter().cloned().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn prefers_text_then_synonyms() {
        assert_eq!(meta_to_text(&md(&[("text", json!("a"))])), "a");
        assert_eq!(meta_to_text(&md(&[("chunk", json!(" b "))])), "b");
        assert_eq!(meta_to_text(&md(&[("content", json!("c"))])), "c");
        assert_eq!(meta_to_text(&md(&[("snippet", json!("d"))])), "d");
        assert_eq!(meta_to_text(&md(&[("body", json!("e"))])), "e");
        // "text" wins over later synonyms
        assert_eq!(
            meta_to_text(&md(&[("body", json!("e")), ("text", json!("a"))])),
            "a"
        );
    }

    #[test]
    fn blank_text_falls_through_to_synonyms() {
        assert_eq!(
            meta_to_text(&md(&[("text", json!("  ")), ("chunk", json!("b"))])),
            "b"
        );
    }

    #[test]
    fn composes_label_as_last_resort() {
        assert_eq!(
            meta_to_text(&md(&[("title", json!("Consent form")), ("label", json!("AMH"))])),
            "Consent form - AMH"
        );
        assert_eq!(meta_to_text(&md(&[("source", json!("intake.pdf"))])), "intake.pdf");
    }

    #[test]
    fn nothing_usable_is_empty() {
        assert_eq!(meta_to_text(&md(&[("score_debug", json!(1))])), "");
        assert_eq!(meta_to_text(&Map::new()), "");
    }

    #[test]
    fn usable_texts_drops_blank_contributions() {
        let hits = vec![
            ScoredMatch {
                score: 0.9,
                metadata: md(&[("text", json!("keep"))]),
            },
            ScoredMatch {
                score: 0.8,
                metadata: Map::new(),
            },
        ];
        assert_eq!(usable_texts(&hits), vec!["keep".to_string()]);
    }

    #[test]
    fn patient_suppresses_everything() {
        let s = select_source(
            vec!["p".into()],
            vec!["c".into()],
            "m".into(),
        );
        assert_eq!(s.used_layers(), vec![LAYER_PATIENT]);
    }

    #[test]
    fn clinic_only_when_patient_empty() {
        let s = select_source(Vec::new(), vec!["c".into()], "m".into());
        assert_eq!(s.used_layers(), vec![LAYER_CLINIC]);
    }

    #[test]
    fn manifest_only_when_both_vector_tiers_empty() {
        let s = select_source(Vec::new(), Vec::new(), "m".into());
        assert_eq!(s.used_layers(), vec![LAYER_MANIFEST]);
    }

    #[test]
    fn general_when_all_empty() {
        let s = select_source(Vec::new(), Vec::new(), String::new());
        assert_eq!(s, PrimarySource::General);
        assert!(s.used_layers().is_empty());
    }
}
