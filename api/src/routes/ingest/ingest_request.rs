use serde::Deserialize;

/// Request payload for /ingest_document.
///
/// Text extraction from the PDF happens upstream; this endpoint receives
/// the already-extracted text.
#[derive(Debug, Deserialize)]
pub struct IngestDocumentRequest {
    /// Short document title; also the record id prefix.
    pub title: String,
    /// policy, faq, guide, etc.
    #[serde(default = "default_doc_type")]
    pub doc_type: String,
    /// Original file name for attribution.
    #[serde(default)]
    pub source: Option<String>,
    /// Extracted document text.
    pub text: String,
    /// Optional namespace override.
    #[serde(default)]
    pub namespace: Option<String>,
}

fn default_doc_type() -> String {
    "policy".to_string()
}

/// Request payload for /ingest_manifest.
#[derive(Debug, Deserialize)]
pub struct IngestManifestRequest {
    pub patient_id: String,
    /// Path of the manifest.json written by the document pipeline.
    pub manifest_path: String,
}
