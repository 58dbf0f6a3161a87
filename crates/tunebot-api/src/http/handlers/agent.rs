//! Agent session endpoint.
//!
//! POST /api/agent
//!
//! Body: `{ "mode"?: "chat" | "auto", "message"?: string, "action"?: "stop" }`.
//!
//! - `action: "stop"` returns `{ "message": "Auto mode stopped" }`.
//! - `chat` and `auto` return a chunked `text/plain` body, one line per
//!   agent output unit (auto adds separators and a final stopped line).
//! - Validation and initialization failures return `500 { "error": ... }`
//!   before any stream is opened.

use std::convert::Infallible;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use futures_util::StreamExt;
use serde_json::json;

use tunebot_core::session::manager::{LineStream, SessionReply};
use tunebot_types::command::AgentCommand;

use crate::http::error::AppError;
use crate::state::AppState;

/// POST /api/agent
pub async fn handle_agent(
    State(state): State<AppState>,
    payload: Result<Json<AgentCommand>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(command) = payload?;
    tracing::debug!(
        mode = command.mode.as_deref().unwrap_or(""),
        action = command.action.as_deref().unwrap_or(""),
        "agent request"
    );

    match state.sessions.handle(command).await? {
        SessionReply::Stopped { message } => Ok(Json(json!({ "message": message })).into_response()),
        SessionReply::Stream(lines) => Ok(stream_response(lines)),
    }
}

/// Wrap a line stream as a chunked plain-text body.
fn stream_response(lines: LineStream) -> Response {
    let body = Body::from_stream(lines.map(Ok::<_, Infallible>));
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}
