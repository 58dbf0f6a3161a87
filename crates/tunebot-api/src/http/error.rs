//! Application error type mapping pre-stream failures to HTTP responses.
//!
//! The agent endpoint has a single error shape: `500 {"error": "<message>"}`.
//! Failures after a stream has opened are written into the stream instead.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use tunebot_types::error::SessionError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Command validation or agent initialization failed.
    Session(SessionError),
    /// The request body was not a valid command document.
    Body(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Session(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::Body(e.body_text())
    }
}

impl AppError {
    pub fn message(&self) -> String {
        match self {
            AppError::Session(e) => e.to_string(),
            AppError::Body(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.message();
        match &self {
            AppError::Session(SessionError::Command(_)) | AppError::Body(_) => {
                tracing::warn!(error = %message, "rejected agent request");
            }
            AppError::Session(_) => {
                tracing::error!(error = %message, "agent request failed");
            }
        }

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(json!({ "error": message })),
        )
            .into_response()
    }
}
