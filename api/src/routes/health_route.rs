//! GET /health — LLM endpoint probes plus vector-store mode.

use std::sync::Arc;

use axum::{extract::State, response::Response};
use serde::Serialize;

use crate::core::app_state::AppState;
use crate::core::http::response_envelope::ok_json;

#[derive(Serialize)]
struct HealthReport {
    llm: Vec<llm_service::health_service::HealthStatus>,
    /// "remote" when the vector index has credentials, "local" otherwise.
    vector_mode: &'static str,
}

/// Handler: GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let llm = state.profiles.health_all().await;
    ok_json(HealthReport {
        llm,
        vector_mode: if state.store.is_remote() { "remote" } else { "local" },
    })
}
