//! Runtime knobs for the grounding engine.
//!
//! Constructed once at process start (see `from_env`) and passed into the
//! engine constructor, so answering is a pure function of its explicit
//! inputs — no call-time environment reads.

/// Config bag for the grounding engine. All fields have defaults.
#[derive(Clone, Debug)]
pub struct GroundingConfig {
    /// Shared knowledge-base namespace used when the caller names none.
    pub clinic_namespace: String,
    /// Top-K requested from each vector namespace.
    pub top_k: usize,
    /// Max patient texts included in the prompt.
    pub patient_text_cap: usize,
    /// Max clinic texts included in the prompt.
    pub clinic_text_cap: usize,
    /// Char budget for the flattened manifest block.
    pub manifest_char_cap: usize,
    /// Completion temperature; low to favor determinism over creativity.
    pub temperature: f32,
    /// Default completion model when the caller names none.
    pub chat_model: String,
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            clinic_namespace: "patient_education".to_string(),
            top_k: 8,
            patient_text_cap: 10,
            clinic_text_cap: 8,
            manifest_char_cap: 8000,
            temperature: 0.2,
            chat_model: "gpt-4o-mini".to_string(),
        }
    }
}

impl GroundingConfig {
    /// Builds from environment variables with the defaults above.
    ///
    /// Variables: `CLINIC_NAMESPACE`, `RAG_TOP_K`, `MANIFEST_CHAR_CAP`,
    /// `GROUNDING_TEMPERATURE`, `OPENAI_CHAT_MODEL`.
    pub fn from_env() -> Self {
        let dflt = Self::default();
        Self {
            clinic_namespace: env("CLINIC_NAMESPACE", &dflt.clinic_namespace),
            top_k: parse("RAG_TOP_K", dflt.top_k),
            patient_text_cap: dflt.patient_text_cap,
            clinic_text_cap: dflt.clinic_text_cap,
            manifest_char_cap: parse("MANIFEST_CHAR_CAP", dflt.manifest_char_cap),
            temperature: parse("GROUNDING_TEMPERATURE", dflt.temperature),
            chat_model: env("OPENAI_CHAT_MODEL", &dflt.chat_model),
        }
    }
}

fn env(k: &str, dflt: &str) -> String {
    std::env::var(k).unwrap_or_else(|_| dflt.to_string())
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> T {
    std::env::var(k)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(dflt)
}
