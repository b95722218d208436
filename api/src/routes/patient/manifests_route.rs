//! Manifest registry routes.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::core::app_state::AppState;
use crate::core::http::response_envelope::{internal_error, ok_json};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ManifestEntry {
    pub manifest_path: String,
    pub ts: i64,
}

/// Handler: GET /patients/{id}/manifests
pub async fn list_manifests(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Response {
    let registry = state.registry.clone();
    let limit = params.limit.unwrap_or(5);
    match tokio::task::spawn_blocking(move || registry.list(&patient_id, limit)).await {
        Ok(Ok(rows)) => ok_json(
            rows.into_iter()
                .map(|(manifest_path, ts)| ManifestEntry { manifest_path, ts })
                .collect::<Vec<_>>(),
        ),
        Ok(Err(e)) => {
            error!(error = %e, "manifest list failed");
            internal_error(e.to_string())
        }
        Err(e) => internal_error(e.to_string()),
    }
}
