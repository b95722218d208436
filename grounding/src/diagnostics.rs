//! Per-answer trace of which sources contributed, for the UI's
//! "Grounding used" panel and for audits.

use serde::{Deserialize, Serialize};

/// Diagnostics attached to every answer.
///
/// A call that dies before grounding (embedding or completion failure)
/// carries only the error; a grounded call carries the full trace. The
/// untagged representation keeps the wire shape of each case minimal:
/// `{"error": ...}` vs. the full key set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Diagnostics {
    Trace(GroundingTrace),
    Failure { error: String },
}

impl Diagnostics {
    pub fn failure(error: impl Into<String>) -> Self {
        Diagnostics::Failure {
            error: error.into(),
        }
    }

    /// The trace, when the call got as far as grounding.
    pub fn trace(&self) -> Option<&GroundingTrace> {
        match self {
            Diagnostics::Trace(t) => Some(t),
            Diagnostics::Failure { .. } => None,
        }
    }
}

/// Which layers were consulted and which one actually grounded the answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundingTrace {
    /// The original question.
    pub question: String,
    /// Private namespace queried, when a patient id was given.
    pub patient_ns: Option<String>,
    /// Usable patient texts found (after metadata extraction).
    pub patient_hits: usize,
    /// Shared namespace queried.
    pub clinic_ns: String,
    /// Usable clinic texts found.
    pub clinic_hits: usize,
    /// Layer names that contributed to the prompt, in precedence order.
    pub used_layers: Vec<String>,
    /// Whether manifest OCR was the grounding source.
    pub used_manifest: bool,
    /// Whether the answer is general, unattributed guidance.
    pub fallback_general: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_serializes_to_error_only() {
        let d = Diagnostics::failure("quota exceeded");
        assert_eq!(serde_json::to_value(&d).unwrap(), json!({"error": "quota exceeded"}));
    }

    #[test]
    fn trace_has_stable_keys() {
        let d = Diagnostics::Trace(GroundingTrace {
            question: "q".into(),
            patient_ns: Some("patient:p01".into()),
            patient_hits: 2,
            clinic_ns: "patient_education".into(),
            clinic_hits: 0,
            used_layers: vec!["Patient Pinecone".into()],
            used_manifest: false,
            fallback_general: false,
        });
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["patient_ns"], "patient:p01");
        assert_eq!(v["patient_hits"], 2);
        assert_eq!(v["used_layers"], json!(["Patient Pinecone"]));
        assert_eq!(v["fallback_general"], false);
    }

    #[test]
    fn round_trips() {
        let d = Diagnostics::failure("x");
        let back: Diagnostics = serde_json::from_str(&serde_json::to_string(&d).unwrap()).unwrap();
        assert_eq!(back, d);
    }
}
