//! POST /ingest_manifest — index a processed manifest for a patient.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::Response};
use doc_manifest::load_manifest;
use tracing::{error, warn};
use vector_store::ingest::ingest_manifest as upsert_manifest_vectors;

use crate::core::app_state::AppState;
use crate::core::http::response_envelope::{error_json, ok_json};
use crate::routes::ingest::ingest_request::IngestManifestRequest;

/// Handler: POST /ingest_manifest
///
/// Reads the manifest, upserts its OCR texts into `patient:<id>`, and
/// registers the path so chat picks the manifest up automatically.
pub async fn ingest_manifest(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IngestManifestRequest>,
) -> Response {
    if body.patient_id.trim().is_empty() {
        return error_json(
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
            "patient_id must not be empty",
        );
    }

    let path = body.manifest_path.clone();
    let manifest = match tokio::task::spawn_blocking(move || load_manifest(&path)).await {
        Ok(Some(m)) => m,
        Ok(None) => {
            return error_json(
                StatusCode::BAD_REQUEST,
                "BAD_MANIFEST",
                format!("manifest not readable at {}", body.manifest_path),
            );
        }
        Err(e) => {
            error!(error = %e, "manifest read task failed");
            return error_json(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", e.to_string());
        }
    };

    let doc_tag = std::path::Path::new(&body.manifest_path)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string);

    let report = match upsert_manifest_vectors(
        &state.store,
        state.embedder.as_ref(),
        &body.patient_id,
        &manifest,
        doc_tag.as_deref(),
    )
    .await
    {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, patient_id = %body.patient_id, "manifest ingestion failed");
            return error_json(StatusCode::BAD_GATEWAY, "INGEST_FAILED", e.to_string());
        }
    };

    // Registration is best-effort: the vectors are already in place.
    let registry = state.registry.clone();
    let pid = body.patient_id.clone();
    let path = body.manifest_path.clone();
    if let Ok(Err(e)) = tokio::task::spawn_blocking(move || registry.register(&pid, &path)).await {
        warn!(error = %e, "manifest registration failed");
    }

    ok_json(report)
}
