//! Ingestion pipelines: chunk → embed → upsert.
//!
//! Two sources feed the index: staff-ingested clinic documents (shared
//! knowledge base namespace, records flagged `pii: false`) and OCR text from
//! a patient's processed manifest (private `patient:<id>` namespace, records
//! flagged `pii: true`). Both return a small report instead of failing on
//! empty input, mirroring how callers display skip reasons.

use doc_manifest::{Manifest, detection_texts};
use serde::{Deserialize, Serialize};
use serde_json::{Map, json};
use tracing::{debug, info};

use crate::VectorStore;
use crate::chunk::{CHUNK_MAX_WORDS, CHUNK_OVERLAP_WORDS, split_words};
use crate::embed::EmbeddingsProvider;
use crate::embed_pool::embed_texts;
use crate::errors::VectorError;
use crate::record::StoredRecord;

/// How many embedding calls run concurrently during ingestion.
const EMBED_CONCURRENCY: usize = 4;

/// Outcome class of one ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestMode {
    /// Nothing to index (empty input); not an error.
    Skip,
    /// Records were upserted into the index (remote or local fallback).
    Upserted,
}

/// Summary of one ingestion run, serializable for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub mode: IngestMode,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl IngestReport {
    fn skip(namespace: Option<&str>, reason: &str) -> Self {
        Self {
            mode: IngestMode::Skip,
            count: 0,
            namespace: namespace.map(str::to_string),
            reason: Some(reason.to_string()),
        }
    }

    fn upserted(namespace: &str, count: usize) -> Self {
        Self {
            mode: IngestMode::Upserted,
            count,
            namespace: Some(namespace.to_string()),
            reason: None,
        }
    }
}

/// Ingests one clinic document's extracted text into the shared namespace.
///
/// The text is chunked into overlapping word windows; each chunk becomes a
/// record `{text, doc_type, title, source, pii: false, kind: "kb"}` with id
/// `<title>:<i>`. Shared-namespace records are never PII, which is what the
/// retrieval filter relies on.
///
/// # Errors
/// Returns embedding or index errors; empty input is a `Skip` report.
pub async fn ingest_clinic_document(
    store: &VectorStore,
    provider: &dyn EmbeddingsProvider,
    namespace: &str,
    title: &str,
    doc_type: &str,
    source: &str,
    text: &str,
) -> Result<IngestReport, VectorError> {
    if text.trim().is_empty() {
        return Ok(IngestReport::skip(Some(namespace), "no extractable text"));
    }
    let chunks = split_words(text, CHUNK_MAX_WORDS, CHUNK_OVERLAP_WORDS);
    if chunks.is_empty() {
        return Ok(IngestReport::skip(Some(namespace), "no chunks after split"));
    }

    debug!(namespace, title, chunks = chunks.len(), "embedding clinic document");
    let vectors = embed_texts(&chunks, provider, None, EMBED_CONCURRENCY).await?;

    let records: Vec<StoredRecord> = vectors
        .into_iter()
        .zip(&chunks)
        .enumerate()
        .map(|(i, (values, chunk))| {
            let mut metadata = Map::new();
            metadata.insert("text".into(), json!(chunk));
            metadata.insert("doc_type".into(), json!(doc_type));
            metadata.insert("title".into(), json!(title));
            metadata.insert("source".into(), json!(source));
            metadata.insert("pii".into(), json!(false));
            metadata.insert("kind".into(), json!("kb"));
            StoredRecord {
                id: format!("{title}:{i:06}"),
                values,
                metadata,
            }
        })
        .collect();

    let count = store.upsert(namespace, &records).await?;
    info!(namespace, title, count, "clinic document ingested");
    Ok(IngestReport::upserted(namespace, count))
}

/// Ingests a manifest's OCR detections into the patient's private namespace.
///
/// Each detection text becomes a record
/// `{text, patient_id, pii: true, kind: "extracted", doc_tag}` with id
/// `<patient_id>:<doc_tag>:<i>` in namespace `patient:<patient_id>`.
///
/// # Errors
/// Returns embedding or index errors; a manifest without OCR text is a
/// `Skip` report.
pub async fn ingest_manifest(
    store: &VectorStore,
    provider: &dyn EmbeddingsProvider,
    patient_id: &str,
    manifest: &Manifest,
    doc_tag: Option<&str>,
) -> Result<IngestReport, VectorError> {
    let namespace = format!("patient:{patient_id}");
    let texts = detection_texts(manifest);
    if texts.is_empty() {
        return Ok(IngestReport::skip(Some(&namespace), "no OCR text"));
    }

    debug!(namespace, texts = texts.len(), "embedding manifest OCR text");
    let vectors = embed_texts(&texts, provider, None, EMBED_CONCURRENCY).await?;

    let tag = doc_tag.unwrap_or("doc");
    let records: Vec<StoredRecord> = vectors
        .into_iter()
        .zip(&texts)
        .enumerate()
        .map(|(i, (values, chunk))| {
            let mut metadata = Map::new();
            metadata.insert("text".into(), json!(chunk));
            metadata.insert("patient_id".into(), json!(patient_id));
            metadata.insert("pii".into(), json!(true));
            metadata.insert("kind".into(), json!("extracted"));
            metadata.insert("doc_tag".into(), json!(tag));
            StoredRecord {
                id: format!("{patient_id}:{tag}:{i:06}"),
                values,
                metadata,
            }
        })
        .collect();

    let count = store.upsert(&namespace, &records).await?;
    info!(namespace, count, "manifest ingested");
    Ok(IngestReport::upserted(&namespace, count))
}
