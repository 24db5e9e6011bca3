//! WebSocket handler for duplex chat sessions.
//!
//! The `/api/v1/chat/ws` endpoint upgrades an HTTP connection to a
//! WebSocket. Each inbound text frame is one chat turn: a JSON
//! `{"identity": "...", "message": "..."}` request, answered with one
//! `{"token", "is_final"}` frame per token plus a final marker frame.
//!
//! Admission is checked once per inbound frame, not once per connection,
//! so a long-lived socket cannot bypass the rate window. Malformed
//! frames are logged and skipped. Any domain failure during a turn is
//! reported to the peer as a single `{"error": "..."}` frame, after
//! which the session closes; peer disconnects close it silently.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::StreamExt;

use parley_core::admission::AdmissionGate;
use parley_types::chat::ChatRequest;
use parley_types::error::ChatError;

use crate::state::AppState;

/// Outcome of one duplex turn that did not raise a domain error.
enum TurnOutcome {
    Completed,
    Disconnected,
}

/// Upgrade an HTTP request to a WebSocket chat session.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_chat_socket(socket, state))
}

/// Core WebSocket session loop: one turn per inbound text frame.
async fn handle_chat_socket(mut socket: WebSocket, state: AppState) {
    loop {
        let frame = match socket.recv().await {
            Some(Ok(Message::Text(text))) => text,
            Some(Ok(Message::Close(_))) | None => break,
            Some(Err(err)) => {
                tracing::debug!("WebSocket receive error: {err}");
                break;
            }
            // Ignore binary, ping, pong protocol frames
            Some(Ok(_)) => continue,
        };

        let request: ChatRequest = match serde_json::from_str(&frame) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(error = %err, "Ignoring malformed chat frame");
                continue;
            }
        };

        match run_turn(&mut socket, &state, &request).await {
            Ok(TurnOutcome::Completed) => {}
            Ok(TurnOutcome::Disconnected) => break,
            Err(err) => {
                tracing::error!(identity = %request.identity, %err, "duplex chat turn failed");
                let frame = serde_json::json!({ "error": err.to_string() });
                let _ = socket.send(Message::Text(frame.to_string().into())).await;
                break;
            }
        }
    }

    tracing::debug!("chat socket closed");
}

/// Run one chat turn, relaying each chunk to the peer as it arrives.
async fn run_turn(
    socket: &mut WebSocket,
    state: &AppState,
    request: &ChatRequest,
) -> Result<TurnOutcome, ChatError> {
    state.admission.admit(&request.identity).await?;

    let mut chunks = state.chat_service.stream_message(request).await?;
    while let Some(item) = chunks.next().await {
        let chunk = item?;
        let json = match serde_json::to_string(&chunk) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(%err, "failed to serialize stream chunk");
                continue;
            }
        };
        if socket.send(Message::Text(json.into())).await.is_err() {
            // Peer went away mid-turn; dropping the chunk stream stops
            // backend reads.
            return Ok(TurnOutcome::Disconnected);
        }
    }

    Ok(TurnOutcome::Completed)
}
