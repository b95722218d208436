//! Per-model invocation settings.

/// Configuration for one OpenAI model endpoint (chat or embeddings).
///
/// The same struct serves both profiles; the embeddings profile simply
/// ignores the sampling fields.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// Model identifier (e.g. `"gpt-4o-mini"`, `"text-embedding-3-small"`).
    pub model: String,

    /// API base URL (e.g. `"https://api.openai.com"`).
    pub endpoint: String,

    /// Bearer token for the API.
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature (0.0 = deterministic).
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}
