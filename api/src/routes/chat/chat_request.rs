use grounding::Diagnostics;
use serde::{Deserialize, Serialize};

/// Request payload for /chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The patient's message.
    pub message: String,
    /// Known identity, when the patient has entered one.
    #[serde(default)]
    pub patient_id: Option<String>,
    /// Optional override of the shared knowledge-base namespace.
    #[serde(default)]
    pub clinic_namespace: Option<String>,
}

/// Response payload for /chat.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Markdown reply shown in the chat transcript.
    pub reply: String,
    /// Grounding trace, present only for RAG-answered turns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Diagnostics>,
}
