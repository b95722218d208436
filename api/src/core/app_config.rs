//! Process-wide configuration, read from the environment exactly once.
//!
//! Everything downstream receives this struct (or a piece of it) explicitly;
//! no component reads the environment at call time.

use std::path::PathBuf;

use grounding::GroundingConfig;
use llm_service::config::default_config::LlmProfilesConfig;
use vector_store::VectorConfig;

/// All runtime settings for one server process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind address, e.g. `127.0.0.1:8080`.
    pub api_address: String,
    /// OpenAI chat + embedding profiles.
    pub llm: LlmProfilesConfig,
    /// Vector index (remote or local-fallback) settings.
    pub vector: VectorConfig,
    /// Grounding engine knobs.
    pub grounding: GroundingConfig,
    /// Appointments + treatments database.
    pub clinic_db: PathBuf,
    /// Embryology updates database.
    pub embryology_db: PathBuf,
    /// Manifest registry database.
    pub registry_db: PathBuf,
}

impl AppConfig {
    /// Builds the full configuration from environment variables.
    ///
    /// Additional variables beyond the nested configs:
    /// - `API_ADDRESS` (default `127.0.0.1:8080`)
    /// - `CLINIC_DB_PATH` (default `storage/clinic.db`)
    /// - `EMBRYOLOGY_DB_PATH` (default `storage/embryology.db`)
    /// - `REGISTRY_DB_PATH` (default `storage/registry.db`)
    ///
    /// # Errors
    /// Propagates LLM profile construction errors (missing API key and the
    /// like); the other sections have full defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_address =
            std::env::var("API_ADDRESS").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        Ok(Self {
            api_address,
            llm: LlmProfilesConfig::from_env()?,
            vector: VectorConfig::from_env(),
            grounding: GroundingConfig::from_env(),
            clinic_db: env_path("CLINIC_DB_PATH", "storage/clinic.db"),
            embryology_db: env_path("EMBRYOLOGY_DB_PATH", "storage/embryology.db"),
            registry_db: env_path("REGISTRY_DB_PATH", "storage/registry.db"),
        })
    }
}

fn env_path(key: &str, dflt: &str) -> PathBuf {
    std::env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(dflt))
}
