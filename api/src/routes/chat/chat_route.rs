//! POST /chat — intent-routed patient chat.
//!
//! Record-card intents answer straight from the relational stores; question
//! intents run the grounding engine. Every branch produces a displayable
//! reply; store failures become an apology line, never an HTTP fault.

use std::sync::Arc;

use axum::{Json, extract::State, response::Response};
use chrono::{DateTime, Utc};
use clinic_store::{Appointment, Treatment, render_updates_markdown};
use grounding::GroundingRequest;
use tracing::error;

use crate::core::app_state::AppState;
use crate::core::http::response_envelope::ok_json;
use crate::routes::ask::ask_question_route::latest_manifest_for;
use crate::routes::chat::chat_request::{ChatRequest, ChatResponse};
use crate::routes::chat::intent::{Intent, classify};

const ASK_FOR_ID: &str = "Please enter your Patient ID first.";
const RECORDS_UNAVAILABLE: &str =
    "Sorry — I couldn't reach your records just now. Please try again in a moment.";

/// Handler: POST /chat
pub async fn chat(State(state): State<Arc<AppState>>, Json(body): Json<ChatRequest>) -> Response {
    let pid = body.patient_id.as_deref().filter(|p| !p.trim().is_empty());

    let reply = match classify(&body.message) {
        Intent::ProcessUpload => plain(match pid {
            None => ASK_FOR_ID.to_string(),
            Some(_) => "Please attach a PDF or image report through the upload flow first; \
                        once it is processed I can read the extracted values."
                .to_string(),
        }),

        Intent::ShowResult => match pid {
            None => plain(ASK_FOR_ID.to_string()),
            Some(pid) => show_result(&state, pid).await,
        },

        Intent::Appointments => match pid {
            None => plain("Please enter your Patient ID to view appointments.".to_string()),
            Some(pid) => appointments_card(&state, pid).await,
        },

        Intent::Treatments => match pid {
            None => plain("Please enter your Patient ID to view treatment status.".to_string()),
            Some(pid) => treatment_card(&state, pid).await,
        },

        Intent::ResultsQa => match pid {
            None => plain(
                "Please enter your Patient ID first so I can search your results.".to_string(),
            ),
            Some(_) => {
                // Nudge the model toward the private layer for results talk.
                let question = format!("(Focus on patient data if available.) {}", body.message);
                grounded(&state, &body, pid, &question).await
            }
        },

        Intent::Answer => grounded(&state, &body, pid, &body.message).await,
    };

    ok_json(reply)
}

fn plain(reply: String) -> ChatResponse {
    ChatResponse {
        reply,
        diagnostics: None,
    }
}

async fn grounded(
    state: &AppState,
    body: &ChatRequest,
    pid: Option<&str>,
    question: &str,
) -> ChatResponse {
    let manifest = match pid {
        Some(p) => latest_manifest_for(state, p).await,
        None => None,
    };
    let out = state
        .engine
        .answer(GroundingRequest {
            question,
            patient_id: pid,
            manifest: manifest.as_ref(),
            clinic_namespace: body.clinic_namespace.as_deref(),
            model: None,
        })
        .await;
    ChatResponse {
        reply: out.answer,
        diagnostics: Some(out.diagnostics),
    }
}

async fn show_result(state: &AppState, patient_id: &str) -> ChatResponse {
    let db = state.embryology.clone();
    let pid = patient_id.to_string();
    match tokio::task::spawn_blocking(move || db.list_updates(&pid, 50)).await {
        Ok(Ok(updates)) => plain(render_updates_markdown(patient_id, &updates)),
        Ok(Err(e)) => {
            error!(error = %e, "embryology lookup failed");
            plain(RECORDS_UNAVAILABLE.to_string())
        }
        Err(e) => {
            error!(error = %e, "embryology task failed");
            plain(RECORDS_UNAVAILABLE.to_string())
        }
    }
}

async fn appointments_card(state: &AppState, patient_id: &str) -> ChatResponse {
    let db = state.clinic.clone();
    let pid = patient_id.to_string();
    let now = Utc::now().timestamp();
    match tokio::task::spawn_blocking(move || db.next_appointment(&pid, now)).await {
        Ok(Ok(Some(appt))) => plain(format_appointment(&appt)),
        Ok(Ok(None)) => plain(
            "I don't see any upcoming appointments. \
             Would you like me to request one for you?"
                .to_string(),
        ),
        Ok(Err(e)) => {
            error!(error = %e, "appointment lookup failed");
            plain(RECORDS_UNAVAILABLE.to_string())
        }
        Err(e) => {
            error!(error = %e, "appointment task failed");
            plain(RECORDS_UNAVAILABLE.to_string())
        }
    }
}

async fn treatment_card(state: &AppState, patient_id: &str) -> ChatResponse {
    let db = state.clinic.clone();
    let pid = patient_id.to_string();
    match tokio::task::spawn_blocking(move || db.current_treatment(&pid)).await {
        Ok(Ok(Some(tx))) => plain(format_treatment(&tx)),
        Ok(Ok(None)) => plain(
            "No treatment plan on file yet. A staff member can add this for you.".to_string(),
        ),
        Ok(Err(e)) => {
            error!(error = %e, "treatment lookup failed");
            plain(RECORDS_UNAVAILABLE.to_string())
        }
        Err(e) => {
            error!(error = %e, "treatment task failed");
            plain(RECORDS_UNAVAILABLE.to_string())
        }
    }
}

fn format_appointment(appt: &Appointment) -> String {
    let when = format_utc(appt.appt_time);
    format!(
        "**Your next appointment**\n\n\
         - When: **{when}** ({tz})\n\
         - Type: {kind}\n\
         - Clinician: {clinician}\n\
         - Status: {status}\n\n\
         _Tip: If you need to change this, message the clinic or ask a staff member._",
        tz = appt.tz,
        kind = appt.appt_type.as_deref().unwrap_or("general visit"),
        clinician = appt.clinician.as_deref().unwrap_or("TBD"),
        status = appt.status,
    )
}

fn format_treatment(tx: &Treatment) -> String {
    let started = tx
        .start_ts
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "N/A".to_string());
    format!(
        "**Your treatment plan**\n\n\
         - Regimen: **{regimen}**\n\
         - Protocol/meds: {protocol}\n\
         - Status: {status}\n\
         - Started: {started}\n\
         - Notes: {notes}\n\n\
         _If anything looks wrong, please contact the care team._",
        regimen = tx.regimen.as_deref().unwrap_or("N/A"),
        protocol = tx.protocol.as_deref().unwrap_or("N/A"),
        status = tx.status,
        notes = tx.notes.as_deref().unwrap_or("-"),
    )
}

fn format_utc(epoch: i64) -> String {
    DateTime::<Utc>::from_timestamp(epoch, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| format!("epoch {epoch}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appointment_card_fills_defaults() {
        let appt = Appointment {
            id: 1,
            patient_id: "p01".into(),
            appt_time: 0,
            tz: "UTC".into(),
            appt_type: None,
            clinician: None,
            notes: None,
            status: "scheduled".into(),
            ts: 0,
        };
        let card = format_appointment(&appt);
        assert!(card.contains("**1970-01-01 00:00 UTC**"));
        assert!(card.contains("Type: general visit"));
        assert!(card.contains("Clinician: TBD"));
    }

    #[test]
    fn treatment_card_formats_start_date() {
        let tx = Treatment {
            id: 1,
            patient_id: "p01".into(),
            regimen: Some("IVF antagonist".into()),
            protocol: None,
            start_ts: Some(86_400),
            end_ts: None,
            status: "ongoing".into(),
            notes: None,
            ts: 0,
        };
        let card = format_treatment(&tx);
        assert!(card.contains("**IVF antagonist**"));
        assert!(card.contains("Started: 1970-01-02"));
        assert!(card.contains("Notes: -"));
    }
}
