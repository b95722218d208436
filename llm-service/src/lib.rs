//! OpenAI-backed LLM plumbing shared by the rest of the workspace.
//!
//! Exposes a thin chat-completion/embeddings client, a two-profile facade
//! (`chat` + `embedding`), a health probe suitable for a `/health` endpoint,
//! and one unified error type. Construct [`profiles::LlmProfiles`] once, wrap
//! it in `Arc`, and hand clones to dependents.

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod profiles;
pub mod services;

pub use config::llm_model_config::LlmModelConfig;
pub use error_handler::{LlmError, Result};
pub use profiles::LlmProfiles;
