//! Synchronous and server-streamed chat endpoints.
//!
//! POST /api/v1/chat/message
//!
//! Without `?stream=true` the full reply is returned as one JSON object.
//! With it, the response body is newline-delimited JSON chunks
//! `{"token": "...", "is_final": false}`, closed by a final marker line
//! with `is_final: true` and an empty token.

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::StreamExt;
use serde::Deserialize;

use parley_core::admission::AdmissionGate;
use parley_types::chat::ChatRequest;
use parley_types::error::ChatError;

use crate::http::error::AppError;
use crate::state::AppState;

/// Query parameters for the message endpoint.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    /// Stream the reply token by token instead of returning it whole.
    #[serde(default)]
    pub stream: bool,
}

/// POST /api/v1/chat/message -- one chat turn, sync or streamed.
pub async fn send_message(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    Json(body): Json<ChatRequest>,
) -> Result<Response, AppError> {
    validate_message(&body.message)?;

    state
        .admission
        .admit(&body.identity)
        .await
        .map_err(ChatError::from)?;

    if !query.stream {
        let reply = state.chat_service.handle_message(&body).await?;
        return Ok(Json(reply).into_response());
    }

    // Store errors surface here as a status response; once the body
    // starts flowing the status line is already sent, so a mid-stream
    // failure can only end the body early.
    let chunks = state.chat_service.stream_message(&body).await?;

    let lines = async_stream::stream! {
        let mut chunks = std::pin::pin!(chunks);
        while let Some(item) = chunks.next().await {
            match item {
                Ok(chunk) => match serde_json::to_string(&chunk) {
                    Ok(json) => yield Ok::<_, Infallible>(format!("{json}\n")),
                    Err(err) => {
                        tracing::warn!(%err, "failed to serialize stream chunk");
                    }
                },
                Err(err) => {
                    tracing::error!(%err, "chat stream failed mid-flight");
                    break;
                }
            }
        }
    };

    Ok((
        [(header::CONTENT_TYPE, "application/json")],
        Body::from_stream(lines),
    )
        .into_response())
}

/// A turn with nothing to say is rejected before it counts against the
/// rate window or touches the store.
fn validate_message(message: &str) -> Result<(), AppError> {
    if message.trim().is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_or_blank_message_is_rejected() {
        assert!(matches!(
            validate_message(""),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_message("   \n\t"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn non_empty_message_passes() {
        assert!(validate_message("hello").is_ok());
    }
}
