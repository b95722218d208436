//! Treatment plan routes.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};
use clinic_store::NewTreatment;
use serde::Serialize;
use tracing::error;

use crate::core::app_state::AppState;
use crate::core::http::response_envelope::{internal_error, ok_json};

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// Handler: POST /treatments
pub async fn add_treatment(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewTreatment>,
) -> Response {
    let db = state.clinic.clone();
    match tokio::task::spawn_blocking(move || db.add_treatment(&body)).await {
        Ok(Ok(id)) => ok_json(CreatedResponse { id }),
        Ok(Err(e)) => {
            error!(error = %e, "treatment create failed");
            internal_error(e.to_string())
        }
        Err(e) => internal_error(e.to_string()),
    }
}

/// Handler: GET /patients/{id}/treatment
pub async fn current_treatment(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<String>,
) -> Response {
    let db = state.clinic.clone();
    match tokio::task::spawn_blocking(move || db.current_treatment(&patient_id)).await {
        Ok(Ok(tx)) => ok_json(tx),
        Ok(Err(e)) => {
            error!(error = %e, "treatment lookup failed");
            internal_error(e.to_string())
        }
        Err(e) => internal_error(e.to_string()),
    }
}
