//! Vector index facade: retrieval + ingestion over a Pinecone-protocol
//! index, with a local brute-force fallback.
//!
//! This crate provides a clean API to:
//! - Search a namespace for the top-K most similar records, with optional
//!   metadata filters
//! - Upsert records produced by the ingestion pipelines
//!
//! With no API key configured, both operations run against flat JSONL files
//! (see [`fallback`]); a failed remote search also degrades to the local
//! path rather than erroring, so retrieval never takes the caller down.

mod config;
mod errors;
mod fallback;
mod filters;
mod pinecone_facade;
mod record;

pub mod chunk;
pub mod embed;
pub mod embed_pool;
pub mod ingest;

pub use config::VectorConfig;
pub use embed::EmbeddingsProvider;
pub use errors::VectorError;
pub use record::{MetadataFilter, ScoredMatch, StoredRecord};

use fallback::LocalIndex;
use pinecone_facade::PineconeFacade;
use tracing::{trace, warn};

/// High-level facade wiring configuration, the remote client, and the
/// local fallback. The single entry point recommended for application code.
pub struct VectorStore {
    remote: Option<PineconeFacade>,
    local: LocalIndex,
}

impl VectorStore {
    /// Constructs a new store from the given configuration.
    ///
    /// Remote mode is selected iff an API key is configured.
    ///
    /// # Errors
    /// Returns `VectorError::Config` if validation or client init fails.
    pub fn new(cfg: VectorConfig) -> Result<Self, VectorError> {
        cfg.validate()?;
        let remote = if cfg.api_key.is_some() {
            Some(PineconeFacade::new(&cfg)?)
        } else {
            None
        };
        Ok(Self {
            remote,
            local: LocalIndex::new(cfg.stub_dir),
        })
    }

    /// Whether searches go to the remote index (vs. the local fallback).
    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Top-K similarity search in one namespace.
    ///
    /// Matches come back best-first. In remote mode a failed call degrades
    /// to the local fallback (logged, not raised); in local mode a missing
    /// namespace file simply yields zero matches.
    ///
    /// # Errors
    /// The current implementation only fails on internal invariant
    /// violations; retrieval problems degrade to empty results by design.
    pub async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
        namespace: &str,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredMatch>, VectorError> {
        trace!(namespace, top_k, remote = self.is_remote(), "VectorStore::search");
        if let Some(remote) = &self.remote {
            match remote.query(vector, top_k, namespace, filter).await {
                Ok(hits) => return Ok(hits),
                Err(e) => {
                    warn!(namespace, error = %e, "remote search failed; using local fallback");
                }
            }
        }
        Ok(self.local.search(namespace, vector, top_k, filter))
    }

    /// Upserts records into one namespace.
    ///
    /// # Errors
    /// Remote mode propagates index/API errors; local mode propagates I/O
    /// and serialization errors.
    pub async fn upsert(
        &self,
        namespace: &str,
        records: &[StoredRecord],
    ) -> Result<usize, VectorError> {
        trace!(namespace, count = records.len(), "VectorStore::upsert");
        match &self.remote {
            Some(remote) => remote.upsert(namespace, records).await,
            None => self.local.append(namespace, records),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    fn rec(id: &str, values: Vec<f32>, text: &str) -> StoredRecord {
        let mut metadata = Map::new();
        metadata.insert("text".into(), json!(text));
        metadata.insert("pii".into(), json!(false));
        StoredRecord {
            id: id.into(),
            values,
            metadata,
        }
    }

    #[tokio::test]
    async fn local_mode_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::new(VectorConfig::local(dir.path())).unwrap();
        assert!(!store.is_remote());

        store
            .upsert("kb", &[rec("a", vec![1.0, 0.0], "alpha"), rec("b", vec![0.0, 1.0], "beta")])
            .await
            .unwrap();

        let hits = store.search(&[1.0, 0.1], 1, "kb", None).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].metadata["text"], "alpha");
    }

    #[tokio::test]
    async fn unknown_namespace_is_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::new(VectorConfig::local(dir.path())).unwrap();
        let hits = store.search(&[1.0], 8, "ghost", None).await.unwrap();
        assert!(hits.is_empty());
    }
}
