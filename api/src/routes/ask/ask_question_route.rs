//! POST /ask_question — direct grounded QA with diagnostics.

use std::sync::Arc;

use axum::{Json, extract::State, response::Response};
use doc_manifest::{Manifest, load_manifest};
use grounding::GroundingRequest;
use tracing::warn;

use crate::core::app_state::AppState;
use crate::core::http::response_envelope::ok_json;
use crate::routes::ask::ask_request::{AskRequest, AskResponse};

/// Handler: POST /ask_question
///
/// Always returns 200 with a displayable answer; backend failures surface
/// as error-string answers inside the payload, never as HTTP faults.
pub async fn ask_question(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AskRequest>,
) -> Response {
    let manifest = match body.patient_id.as_deref() {
        Some(pid) => latest_manifest_for(&state, pid).await,
        None => None,
    };

    let out = state
        .engine
        .answer(GroundingRequest {
            question: &body.question,
            patient_id: body.patient_id.as_deref(),
            manifest: manifest.as_ref(),
            clinic_namespace: body.clinic_namespace.as_deref(),
            model: body.model.as_deref(),
        })
        .await;

    ok_json(AskResponse {
        answer: out.answer,
        diagnostics: out.diagnostics,
    })
}

/// Loads the most recently registered manifest for a patient, treating
/// every failure as "no manifest".
pub(crate) async fn latest_manifest_for(state: &AppState, patient_id: &str) -> Option<Manifest> {
    let registry = state.registry.clone();
    let pid = patient_id.to_string();
    let path = tokio::task::spawn_blocking(move || registry.latest(&pid))
        .await
        .ok()?
        .unwrap_or_else(|e| {
            warn!(error = %e, "manifest registry lookup failed");
            None
        })?;
    tokio::task::spawn_blocking(move || load_manifest(&path)).await.ok()?
}
