//! OpenAI embedding provider backed by the shared LLM profiles.

use std::sync::Arc;

use llm_service::LlmProfiles;

use crate::embed::EmbeddingsProvider;
use crate::errors::VectorError;

/// Embedder over the shared profiles, enforcing the index dimensionality.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    svc: Arc<LlmProfiles>,
    dim: usize,
}

impl OpenAiEmbedder {
    /// Uses the embedding profile of `svc`; `dim` must match what the vector
    /// index was provisioned with.
    pub fn new(svc: Arc<LlmProfiles>, dim: usize) -> Self {
        Self { svc, dim }
    }
}

impl EmbeddingsProvider for OpenAiEmbedder {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<f32>, VectorError>> + Send + 'a>,
    > {
        Box::pin(async move {
            let vector = self
                .svc
                .embed(text)
                .await
                .map_err(|e| VectorError::Embedding(e.to_string()))?;

            if vector.len() != self.dim {
                return Err(VectorError::VectorSizeMismatch {
                    got: vector.len(),
                    want: self.dim,
                });
            }
            Ok(vector)
        })
    }
}
