//! HTTP API for the clinic assistant.
//!
//! Routes are thin: they deserialize, delegate to the grounding engine or
//! the stores, and wrap the result in the JSON envelope. All shared clients
//! live in [`crate::core::app_state::AppState`], built once from the
//! explicit [`crate::core::app_config::AppConfig`].

use std::error::Error;
use std::sync::Arc;

pub mod core;
mod routes;

pub use crate::core::app_config::AppConfig;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tracing::info;

use crate::core::app_state::AppState;
use crate::routes::ask::ask_question_route::ask_question;
use crate::routes::chat::chat_route::chat;
use crate::routes::health_route::health;
use crate::routes::ingest::ingest_document_route::ingest_document;
use crate::routes::ingest::ingest_manifest_route::ingest_manifest;
use crate::routes::patient::appointments_route::{
    create_appointment, list_appointments, next_appointment,
};
use crate::routes::patient::embryology_route::{add_embryology_update, list_embryology_updates};
use crate::routes::patient::manifests_route::list_manifests;
use crate::routes::patient::treatments_route::{add_treatment, current_treatment};

/// Builds state from `cfg`, binds, and serves until Ctrl+C.
///
/// # Errors
/// Returns startup errors (state construction, bind); request-level
/// failures never abort the server.
pub async fn start(cfg: AppConfig) -> Result<(), Box<dyn Error>> {
    let addr = cfg.api_address.clone();
    let state = Arc::new(AppState::from_config(cfg)?);

    let app = Router::new()
        .route("/chat", post(chat))
        .route("/ask_question", post(ask_question))
        .route("/ingest_document", post(ingest_document))
        .route("/ingest_manifest", post(ingest_manifest))
        .route("/appointments", post(create_appointment))
        .route("/patients/{id}/appointments", get(list_appointments))
        .route("/patients/{id}/next_appointment", get(next_appointment))
        .route("/treatments", post(add_treatment))
        .route("/patients/{id}/treatment", get(current_treatment))
        .route("/embryology", post(add_embryology_update))
        .route("/patients/{id}/embryology", get(list_embryology_updates))
        .route("/patients/{id}/manifests", get(list_manifests))
        .route("/health", get(health))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "clinic assistant API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    signal::ctrl_c()
        .await
        .expect("failed to listen for shutdown signal");
}
