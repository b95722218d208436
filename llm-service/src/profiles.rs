//! Two-profile LLM facade: `chat` and `embedding`.
//!
//! Construct once, wrap in `Arc`, and pass clones to dependents. Both
//! underlying HTTP clients are built eagerly at construction so that
//! misconfiguration surfaces at startup, not on the first request.

use std::sync::Arc;

use crate::config::default_config::LlmProfilesConfig;
use crate::config::llm_model_config::LlmModelConfig;
use crate::error_handler::Result;
use crate::health_service::{HealthService, HealthStatus};
use crate::services::open_ai_service::OpenAiService;

/// Shared service managing the two logical profiles used by the app:
/// **chat** (answer generation) and **embedding** (query/chunk vectors).
pub struct LlmProfiles {
    chat_cfg: LlmModelConfig,
    embedding_cfg: LlmModelConfig,
    /// Embedding dimensionality the vector index expects.
    embedding_dim: usize,

    chat: Arc<OpenAiService>,
    embedding: Arc<OpenAiService>,
    health: HealthService,
}

impl LlmProfiles {
    /// Creates the facade from a complete profiles config.
    ///
    /// # Errors
    /// Propagates client construction errors (missing key, bad endpoint).
    pub fn new(cfg: LlmProfilesConfig, health_timeout_secs: Option<u64>) -> Result<Self> {
        let chat = Arc::new(OpenAiService::new(cfg.chat.clone())?);
        let embedding = Arc::new(OpenAiService::new(cfg.embedding.clone())?);
        Ok(Self {
            chat_cfg: cfg.chat,
            embedding_cfg: cfg.embedding,
            embedding_dim: cfg.embedding_dim,
            chat,
            embedding,
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Generates text with the chat profile's configured model and sampling.
    ///
    /// # Errors
    /// Returns [`crate::LlmError`] if generation fails.
    pub async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String> {
        self.chat.generate(prompt, system).await
    }

    /// Generates text with a per-call model and temperature override.
    ///
    /// The model name is opaque to this layer.
    pub async fn generate_with(
        &self,
        prompt: &str,
        system: Option<&str>,
        model: &str,
        temperature: f32,
    ) -> Result<String> {
        self.chat
            .generate_with(prompt, system, model, Some(temperature))
            .await
    }

    /// Computes an embedding vector with the embedding profile.
    ///
    /// # Errors
    /// Returns [`crate::LlmError`] if the call fails.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>> {
        self.embedding.embeddings(input).await
    }

    /// The embedding dimensionality the vector index was provisioned with.
    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    /// Health snapshots for the distinct profiles (chat probed once when both
    /// profiles share model + endpoint).
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let mut list = Vec::with_capacity(2);
        list.push(self.chat_cfg.clone());
        if self.embedding_cfg != self.chat_cfg {
            list.push(self.embedding_cfg.clone());
        }
        self.health.check_many(&list).await
    }

    /// References to the current profile configs `(chat, embedding)`.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (&self.chat_cfg, &self.embedding_cfg)
    }
}
