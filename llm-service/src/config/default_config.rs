//! Environment-driven construction of the chat and embedding profiles.
//!
//! Read once at process start; nothing in this crate touches the environment
//! after construction.

use crate::config::llm_model_config::LlmModelConfig;
use crate::error_handler::{
    Result, env_opt_u32, env_opt_usize, must_env, validate_http_endpoint,
};

/// Both profile configs plus the embedding dimensionality the vector index
/// was provisioned with.
#[derive(Debug, Clone)]
pub struct LlmProfilesConfig {
    pub chat: LlmModelConfig,
    pub embedding: LlmModelConfig,
    /// Expected embedding vector size (must match the vector index).
    pub embedding_dim: usize,
}

impl LlmProfilesConfig {
    /// Builds both profiles from the environment.
    ///
    /// Environment variables:
    /// - `OPENAI_API_KEY` (required)
    /// - `OPENAI_BASE_URL` (default `https://api.openai.com`)
    /// - `OPENAI_CHAT_MODEL` (default `gpt-4o-mini`)
    /// - `OPENAI_EMBED_MODEL` (default `text-embedding-3-small`)
    /// - `EMBEDDING_DIM` (default 1536)
    /// - `OPENAI_MAX_TOKENS` (optional)
    /// - `OPENAI_TIMEOUT_SECS` (optional, default 60)
    ///
    /// # Errors
    /// Returns a config error when the key is missing, the base URL is not
    /// an HTTP(S) endpoint, or a numeric variable fails to parse.
    pub fn from_env() -> Result<Self> {
        let api_key = must_env("OPENAI_API_KEY")?;
        let endpoint =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com".into());
        validate_http_endpoint("OPENAI_BASE_URL", &endpoint)?;

        let chat_model =
            std::env::var("OPENAI_CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        let embed_model =
            std::env::var("OPENAI_EMBED_MODEL").unwrap_or_else(|_| "text-embedding-3-small".into());
        let embedding_dim = env_opt_usize("EMBEDDING_DIM")?.unwrap_or(1536);
        let max_tokens = env_opt_u32("OPENAI_MAX_TOKENS")?;
        let timeout_secs = env_opt_u32("OPENAI_TIMEOUT_SECS")?.map(u64::from).or(Some(60));

        let chat = LlmModelConfig {
            model: chat_model,
            endpoint: endpoint.clone(),
            api_key: Some(api_key.clone()),
            max_tokens,
            temperature: None,
            top_p: None,
            timeout_secs,
        };
        let embedding = LlmModelConfig {
            model: embed_model,
            endpoint,
            api_key: Some(api_key),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs,
        };

        Ok(Self {
            chat,
            embedding,
            embedding_dim,
        })
    }
}
