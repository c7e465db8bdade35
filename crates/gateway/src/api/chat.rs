//! Chat ingress for clients that drive a session over plain HTTP and follow
//! the results over `/sse/:session_id`.
//!
//! - `POST /v1/chat` — accept a message for a session

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use crate::api::domain_error;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub content: String,
}

/// Queue a message for the producer.
///
/// 202 means accepted: the request is on the bus and will run to completion;
/// its chunks arrive on the session's event stream.
pub async fn send_message(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Response {
    match state.chat.send_message(&body.session_id, &body.content).await {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({
                "session_id": body.session_id,
                "accepted": true,
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::debug!(session_id = %body.session_id, error = %e, "chat request rejected");
            domain_error(e)
        }
    }
}
