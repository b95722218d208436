//! Appointment CRUD routes.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};
use chrono::Utc;
use clinic_store::NewAppointment;
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
    pub from: Option<i64>,
    #[serde(default)]
    pub to: Option<i64>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Handler: POST /appointments
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewAppointment>,
) -> Response {
    let db = state.clinic.clone();
    match tokio::task::spawn_blocking(move || db.create_appointment(&body)).await {
        Ok(Ok(id)) => ok_json(CreatedResponse { id }),
        Ok(Err(e)) => {
            error!(error = %e, "appointment create failed");
            internal_error(e.to_string())
        }
        Err(e) => internal_error(e.to_string()),
    }
}

/// Handler: GET /patients/{id}/appointments
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Response {
    let db = state.clinic.clone();
    let limit = params.limit.unwrap_or(20);
    match tokio::task::spawn_blocking(move || {
        db.list_appointments(&patient_id, params.from, params.to, limit)
    })
    .await
    {
        Ok(Ok(rows)) => ok_json(rows),
        Ok(Err(e)) => {
            error!(error = %e, "appointment list failed");
            internal_error(e.to_string())
        }
        Err(e) => internal_error(e.to_string()),
    }
}

/// Handler: GET /patients/{id}/next_appointment
pub async fn next_appointment(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<String>,
) -> Response {
    let db = state.clinic.clone();
    let now = Utc::now().timestamp();
    match tokio::task::spawn_blocking(move || db.next_appointment(&patient_id, now)).await {
        Ok(Ok(next)) => ok_json(next),
        Ok(Err(e)) => {
            error!(error = %e, "next appointment lookup failed");
            internal_error(e.to_string())
        }
        Err(e) => internal_error(e.to_string()),
    }
}
