//! Shared state for all HTTP handlers.

use std::sync::Arc;

use clinic_store::{ClinicDb, EmbryologyDb, ManifestRegistry};
use grounding::{GroundingConfig, GroundingEngine};
use llm_service::LlmProfiles;
use vector_store::{VectorStore, embed::openai::OpenAiEmbedder};

use crate::core::app_config::AppConfig;

/// Everything a handler needs, wired once at startup.
pub struct AppState {
    pub engine: GroundingEngine,
    pub profiles: Arc<LlmProfiles>,
    pub store: Arc<VectorStore>,
    pub embedder: Arc<OpenAiEmbedder>,
    pub clinic: ClinicDb,
    pub embryology: EmbryologyDb,
    pub registry: ManifestRegistry,
    /// Kept for ingestion handlers (default clinic namespace).
    pub grounding_cfg: GroundingConfig,
}

impl AppState {
    /// Builds all shared clients from the explicit configuration.
    ///
    /// # Errors
    /// Fails fast on misconfigured LLM or vector clients so the operator
    /// sees the problem at startup rather than on the first request.
    pub fn from_config(cfg: AppConfig) -> anyhow::Result<Self> {
        let profiles = Arc::new(LlmProfiles::new(cfg.llm, Some(10))?);
        let store = Arc::new(VectorStore::new(cfg.vector)?);
        let embedder = Arc::new(OpenAiEmbedder::new(profiles.clone(), profiles.embedding_dim()));

        let engine = GroundingEngine::new(
            store.clone(),
            embedder.clone(),
            profiles.clone(),
            cfg.grounding.clone(),
        );

        Ok(Self {
            engine,
            profiles,
            store,
            embedder,
            clinic: ClinicDb::new(cfg.clinic_db),
            embryology: EmbryologyDb::new(cfg.embryology_db),
            registry: ManifestRegistry::new(cfg.registry_db),
            grounding_cfg: cfg.grounding,
        })
    }
}
