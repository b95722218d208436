use grounding::Diagnostics;
use serde::{Deserialize, Serialize};

/// Request payload for /ask_question.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// Natural language question.
    pub question: String,
    /// Enables the private patient namespace (and the latest registered
    /// manifest) when present.
    #[serde(default)]
    pub patient_id: Option<String>,
    /// Optional override of the shared knowledge-base namespace.
    #[serde(default)]
    pub clinic_namespace: Option<String>,
    /// Optional completion model override (opaque string).
    #[serde(default)]
    pub model: Option<String>,
}

/// Response payload for /ask_question.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    /// Final answer, including the Sources footer.
    pub answer: String,
    /// Which layers grounded the answer (or the error that stopped it).
    pub diagnostics: Diagnostics,
}
