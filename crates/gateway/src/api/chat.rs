//! Chat streaming endpoint.
//!
//! `POST /v1/chats/{chat_id}/stream` runs one turn and streams wire
//! events as newline-delimited JSON (`application/x-ndjson`, one event
//! per line, each line independently parseable). Raw NDJSON, not SSE:
//! there is no `data:` framing.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::stream::Stream;
use serde::Deserialize;
use uuid::Uuid;

use crate::runtime::{stream_turn, ChatEvent, StreamInput};
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request shape
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct StreamChatRequest {
    /// User message text.
    pub message: String,
    /// Optional model spec override (e.g. "openai/gpt-4o").
    #[serde(default)]
    pub model: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/chats/{chat_id}/stream
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn stream_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<Uuid>,
    Json(body): Json<StreamChatRequest>,
) -> Response {
    // Pre-flight: reject early with 503 if no LLM providers are available.
    if let Err(resp) = require_llm_provider(&state) {
        return resp.into_response();
    }

    if body.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "message must not be empty" })),
        )
            .into_response();
    }

    let rx = stream_turn(
        state,
        StreamInput {
            chat_id,
            user_message: body.message,
            model: body.model,
        },
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(ndjson_lines(rx)))
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to build streaming response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
}

/// Serialize each event to one JSON line. Serialization of our own enum
/// cannot fail; a defective event is dropped rather than poisoning the
/// stream.
fn ndjson_lines(
    mut rx: tokio::sync::mpsc::Receiver<ChatEvent>,
) -> impl Stream<Item = Result<String, std::convert::Infallible>> {
    async_stream::stream! {
        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(mut line) => {
                    line.push('\n');
                    yield Ok(line);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to serialize chat event");
                }
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Pre-flight
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Return a structured 503 when no LLM providers are registered, so
/// callers get a clear signal instead of an error event buried in a
/// stream.
fn require_llm_provider(
    state: &AppState,
) -> Result<(), (StatusCode, Json<serde_json::Value>)> {
    if !state.llm.is_empty() {
        return Ok(());
    }

    Err((
        StatusCode::SERVICE_UNAVAILABLE,
        Json(serde_json::json!({
            "error": "no_llm_provider",
            "reason": "No LLM providers are registered. Configure at least one \
                       provider before streaming chats.",
        })),
    ))
}
