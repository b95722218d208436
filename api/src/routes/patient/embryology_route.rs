//! Embryology update routes.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};
use clinic_store::NewEmbryologyUpdate;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::core::app_state::AppState;
use crate::core::http::response_envelope::{internal_error, ok_json};

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Handler: POST /embryology
pub async fn add_embryology_update(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewEmbryologyUpdate>,
) -> Response {
    let db = state.embryology.clone();
    match tokio::task::spawn_blocking(move || db.add_update(&body)).await {
        Ok(Ok(id)) => ok_json(CreatedResponse { id }),
        Ok(Err(e)) => {
            error!(error = %e, "embryology update create failed");
            internal_error(e.to_string())
        }
        Err(e) => internal_error(e.to_string()),
    }
}

/// Handler: GET /patients/{id}/embryology
pub async fn list_embryology_updates(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Response {
    let db = state.embryology.clone();
    let limit = params.limit.unwrap_or(50);
    match tokio::task::spawn_blocking(move || db.list_updates(&patient_id, limit)).await {
        Ok(Ok(rows)) => ok_json(rows),
        Ok(Err(e)) => {
            error!(error = %e, "embryology list failed");
            internal_error(e.to_string())
        }
        Err(e) => internal_error(e.to_string()),
    }
}
