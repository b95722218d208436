//! Universal JSON envelope for success and error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// `{success, data?, error?}` — exactly one of `data`/`error` is present.
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[derive(Serialize)]
pub struct ApiError {
    /// Stable, machine-readable error code (e.g. "BAD_REQUEST").
    pub code: &'static str,
    /// Human-friendly error message.
    pub message: String,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// Build a success envelope.
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// 200 with a success envelope.
pub fn ok_json<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// Error envelope with the given status.
pub fn error_json(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    let body = ApiResponse::<()> {
        success: false,
        data: None,
        error: Some(ApiError {
            code,
            message: message.into(),
        }),
    };
    (status, Json(body)).into_response()
}

/// 500 envelope for unexpected internals (join errors, store failures).
pub fn internal_error(message: impl Into<String>) -> Response {
    error_json(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", message)
}
