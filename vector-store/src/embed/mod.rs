use crate::errors::VectorError;
use std::{future::Future, pin::Pin};

/// Provider interface for embedding generation.
///
/// Async because real providers perform HTTP requests. Implement this trait
/// to plug in another embedding backend (or a deterministic fake in tests).
pub trait EmbeddingsProvider: Send + Sync {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, VectorError>> + Send + 'a>>;
}

pub mod openai;
