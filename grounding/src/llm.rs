//! Completion seam for the engine.
//!
//! The engine talks to the completion backend through this trait so that
//! tests can substitute a deterministic fake; the production impl simply
//! forwards to the shared [`LlmProfiles`].

use std::{future::Future, pin::Pin};

use llm_service::LlmProfiles;
use thiserror::Error;

/// Opaque completion failure, already rendered for display.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{0}")]
pub struct CompletionError(pub String);

/// Chat-completion backend.
pub trait CompletionProvider: Send + Sync {
    /// Sends a `(system, user)` prompt pair to the named model and returns
    /// the assistant's text. The model name is opaque to the engine.
    fn complete<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
        model: &'a str,
        temperature: f32,
    ) -> Pin<Box<dyn Future<Output = Result<String, CompletionError>> + Send + 'a>>;
}

impl CompletionProvider for LlmProfiles {
    fn complete<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
        model: &'a str,
        temperature: f32,
    ) -> Pin<Box<dyn Future<Output = Result<String, CompletionError>> + Send + 'a>> {
        Box::pin(async move {
            self.generate_with(user, Some(system), model, temperature)
                .await
                .map_err(|e| CompletionError(e.to_string()))
        })
    }
}
