//! WebSocket ingress endpoint.
//!
//! Flow:
//! 1. Client connects to `/ws` (optionally `?session_id=<id>` to reattach)
//! 2. Gateway registers the session and announces it in a `session` frame
//! 3. Ingress pump: every inbound text frame becomes a chat request for the
//!    connection's session
//! 4. Heartbeat pump: a ping every `read_timeout * 9/10` keeps the link warm
//!
//! Results do not travel back over this socket; clients follow them on
//! `/sse/:session_id`. Both pumps share one close signal: whichever side
//! fails first tears the other down, and the session is marked inactive
//! (not deleted) once the connection is gone.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use rc_domain::SessionId;

use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Query params
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Existing session to reattach to. A fresh id is generated when absent.
    pub session_id: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Handler
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// GET /ws — upgrade to WebSocket.
pub async fn chat_ws(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
) -> impl IntoResponse {
    let requested = match query.session_id.map(SessionId::new).transpose() {
        Ok(id) => id,
        Err(e) => {
            return (axum::http::StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, requested))
        .into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Socket handler
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

async fn handle_socket(socket: WebSocket, state: AppState, requested: Option<SessionId>) {
    let session = state.registry.create(requested);
    let session_id = session.id.clone();

    let write_timeout = state.config.stream.write_timeout();
    let read_timeout = state.config.stream.read_timeout();
    let heartbeat_interval = state.config.stream.heartbeat_interval();

    let (mut ws_sink, ws_stream) = socket.split();

    // Announce the session so the client can open its event stream.
    let hello = serde_json::json!({
        "type": "session",
        "session_id": session_id,
    });
    if write_frame(&mut ws_sink, Message::Text(hello.to_string()), write_timeout)
        .await
        .is_err()
    {
        tracing::warn!(session_id = %session_id, "failed to send session frame");
        state.registry.close(&session_id);
        return;
    }

    tracing::info!(session_id = %session_id, "connection open");

    // Both pumps exit when either cancels this token.
    let closed = CancellationToken::new();

    let heartbeat = tokio::spawn(heartbeat_pump(
        ws_sink,
        closed.clone(),
        session_id.clone(),
        heartbeat_interval,
        write_timeout,
    ));

    ingress_pump(ws_stream, &state, &session_id, &closed, read_timeout).await;

    closed.cancel();
    let _ = heartbeat.await;

    // The conversation outlives the connection: inactive, not deleted.
    state.registry.close(&session_id);
    tracing::info!(session_id = %session_id, "connection closed");
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Pumps
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Blocking read loop: text frames become chat requests; any frame (pongs
/// included) refreshes the read deadline. Exits on error, EOF, timeout, or
/// the shared close signal.
async fn ingress_pump(
    mut ws_stream: SplitStream<WebSocket>,
    state: &AppState,
    session_id: &SessionId,
    closed: &CancellationToken,
    read_timeout: Duration,
) {
    loop {
        let frame = tokio::select! {
            _ = closed.cancelled() => break,
            frame = tokio::time::timeout(read_timeout, ws_stream.next()) => frame,
        };

        match frame {
            Err(_) => {
                tracing::warn!(session_id = %session_id, "read timeout, closing connection");
                break;
            }
            Ok(None) => break,
            Ok(Some(Err(e))) => {
                tracing::warn!(session_id = %session_id, error = %e, "read error");
                break;
            }
            Ok(Some(Ok(Message::Text(text)))) => {
                // A rejected message (closed session, full queue teardown)
                // only affects this request, not the connection.
                if let Err(e) = state.chat.send_message(session_id.as_str(), &text).await {
                    tracing::warn!(
                        session_id = %session_id,
                        error = %e,
                        "inbound message rejected"
                    );
                }
            }
            Ok(Some(Ok(Message::Close(_)))) => break,
            // Pings are answered by axum; both directions count as liveness.
            Ok(Some(Ok(_))) => {}
        }
    }
    closed.cancel();
}

/// Liveness loop: periodic pings, teardown of the transport on exit.
async fn heartbeat_pump(
    mut ws_sink: SplitSink<WebSocket, Message>,
    closed: CancellationToken,
    session_id: SessionId,
    interval: Duration,
    write_timeout: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick fires immediately; skip it so pings start one interval in.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = closed.cancelled() => break,
            _ = ticker.tick() => {
                if write_frame(&mut ws_sink, Message::Ping(Vec::new()), write_timeout)
                    .await
                    .is_err()
                {
                    tracing::warn!(session_id = %session_id, "heartbeat failed, closing connection");
                    closed.cancel();
                    break;
                }
            }
        }
    }

    let _ = ws_sink.close().await;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

async fn write_frame(
    ws_sink: &mut SplitSink<WebSocket, Message>,
    message: Message,
    write_timeout: Duration,
) -> Result<(), ()> {
    match tokio::time::timeout(write_timeout, ws_sink.send(message)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(_)) | Err(_) => Err(()),
    }
}
