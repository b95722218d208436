//! Embedding executor with bounded concurrency and dimension checks.

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::embed::EmbeddingsProvider;
use crate::errors::VectorError;

/// Embeds a batch of texts, preserving input order in the output.
///
/// # Arguments
/// - `texts`: inputs to embed.
/// - `provider`: embedding backend.
/// - `expected_dim`: if `Some`, enforces this vector size (error on mismatch).
/// - `concurrency`: maximum number of in-flight embedding calls.
///
/// # Errors
/// Returns [`VectorError::VectorSizeMismatch`] on a dimension mismatch, or
/// the provider's error for a failed call.
pub async fn embed_texts(
    texts: &[String],
    provider: &dyn EmbeddingsProvider,
    expected_dim: Option<usize>,
    concurrency: usize,
) -> Result<Vec<Vec<f32>>, VectorError> {
    info!(
        "embed_pool::embed_texts: total={} concurrency={}",
        texts.len(),
        concurrency
    );
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let results: Vec<(usize, Vec<f32>)> = stream::iter(texts.iter().cloned().enumerate())
        .map(|(i, text)| async move {
            let v = provider.embed(&text).await?;
            Ok::<(usize, Vec<f32>), VectorError>((i, v))
        })
        .buffer_unordered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, VectorError>>()?;

    let mut out = vec![Vec::new(); texts.len()];
    for (i, v) in results {
        if let Some(want) = expected_dim {
            if v.len() != want {
                return Err(VectorError::VectorSizeMismatch { got: v.len(), want });
            }
        }
        out[i] = v;
    }

    debug!("embed_pool::embed_texts: embeddings filled");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{future::Future, pin::Pin};

    struct CountingEmbedder;

    impl EmbeddingsProvider for CountingEmbedder {
        fn embed<'a>(
            &'a self,
            text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, VectorError>> + Send + 'a>> {
            Box::pin(async move { Ok(vec![text.len() as f32, 1.0]) })
        }
    }

    #[tokio::test]
    async fn preserves_input_order() {
        let texts: Vec<String> = vec!["a".into(), "bbb".into(), "cc".into()];
        let out = embed_texts(&texts, &CountingEmbedder, Some(2), 2).await.unwrap();
        assert_eq!(out[0][0], 1.0);
        assert_eq!(out[1][0], 3.0);
        assert_eq!(out[2][0], 2.0);
    }

    #[tokio::test]
    async fn rejects_dimension_mismatch() {
        let texts = vec!["x".to_string()];
        let err = embed_texts(&texts, &CountingEmbedder, Some(3), 1).await;
        assert!(matches!(
            err,
            Err(VectorError::VectorSizeMismatch { got: 2, want: 3 })
        ));
    }
}
