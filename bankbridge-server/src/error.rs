//! HTTP error mapping
//!
//! | core error                | status            | body                                   |
//! |---------------------------|-------------------|----------------------------------------|
//! | `Validation`, `InvalidState` | 400            | `{error}`                              |
//! | `Upstream`                | upstream status   | `{error, details}`                     |
//! | anything else             | 500               | `{error}`                              |
//!
//! `ApiError::wrapped` forces a 500 and reports the upstream status and body
//! alongside (used by link-token creation).

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value as JsonValue};

use bankbridge_core::Error;

#[derive(Debug)]
pub enum ApiError {
    /// Core error mapped by its own kind
    Core(Error),
    /// Core error reported as a 500 with a fixed message
    Wrapped {
        message: &'static str,
        source: Error,
    },
    /// Malformed request body or query string
    BadRequest(String),
}

impl ApiError {
    /// Build a mapper that wraps any core error as a 500 with `message`
    pub fn wrapped(message: &'static str) -> impl FnOnce(Error) -> ApiError {
        move |source| ApiError::Wrapped { message, source }
    }

    fn status_and_body(self) -> (StatusCode, JsonValue) {
        match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            ApiError::Wrapped { message, source } => {
                let body = match source {
                    Error::Upstream { status, body, .. } => json!({
                        "error": message,
                        "upstream_status": status,
                        "details": body,
                    }),
                    other => json!({ "error": message, "details": other.to_string() }),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
            ApiError::Core(err) => match err {
                Error::Validation(message) | Error::InvalidState(message) => {
                    (StatusCode::BAD_REQUEST, json!({ "error": message }))
                }
                Error::Upstream {
                    provider,
                    status,
                    body,
                } => {
                    let code = StatusCode::from_u16(status)
                        .ok()
                        .filter(|s| s.is_client_error() || s.is_server_error())
                        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                    (
                        code,
                        json!({
                            "error": format!("{} request failed", provider),
                            "details": body,
                        }),
                    )
                }
                other => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": other.to_string() }),
                ),
            },
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Core(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %body["error"], "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %body["error"], "request rejected");
        }
        (status, Json(body)).into_response()
    }
}
