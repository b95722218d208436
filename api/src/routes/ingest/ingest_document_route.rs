//! POST /ingest_document — staff ingestion into the clinic knowledge base.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::Response};
use tracing::error;
use vector_store::ingest::ingest_clinic_document;

use crate::core::app_state::AppState;
use crate::core::http::response_envelope::{error_json, ok_json};
use crate::routes::ingest::ingest_request::IngestDocumentRequest;

/// Handler: POST /ingest_document
///
/// Chunks, embeds, and upserts the extracted text into the shared
/// namespace; empty input yields a `skip` report rather than an error.
pub async fn ingest_document(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IngestDocumentRequest>,
) -> Response {
    if body.title.trim().is_empty() {
        return error_json(StatusCode::BAD_REQUEST, "BAD_REQUEST", "title must not be empty");
    }

    let namespace = body
        .namespace
        .as_deref()
        .unwrap_or(&state.grounding_cfg.clinic_namespace);
    let source = body.source.as_deref().unwrap_or(&body.title);

    match ingest_clinic_document(
        &state.store,
        state.embedder.as_ref(),
        namespace,
        &body.title,
        &body.doc_type,
        source,
        &body.text,
    )
    .await
    {
        Ok(report) => ok_json(report),
        Err(e) => {
            error!(error = %e, title = %body.title, "clinic ingestion failed");
            error_json(StatusCode::BAD_GATEWAY, "INGEST_FAILED", e.to_string())
        }
    }
}
