pub mod chat;
pub mod sessions;
pub mod sse;
pub mod ws;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;

use rc_domain::Error;

use crate::state::AppState;

/// Build the full API router.
pub fn router() -> Router<AppState> {
    Router::new()
        // Liveness probe
        .route("/healthz", get(health))
        // WebSocket ingress (session registration + inbound messages + heartbeat)
        .route("/ws", get(ws::chat_ws))
        // SSE egress (per-session result stream)
        .route("/sse/:session_id", get(sse::session_events))
        // Session management
        .route(
            "/v1/sessions",
            post(sessions::create_session).get(sessions::list_sessions),
        )
        .route(
            "/v1/sessions/:id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/v1/sessions/:id/close", post(sessions::close_session))
        // Chat ingress for non-WebSocket clients
        .route("/v1/chat", post(chat::send_message))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Build a standardized JSON error response: `{ "error": "<message>" }`.
pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Map a domain error onto the HTTP taxonomy: bad input is the caller's
/// problem, a full/closed bus is a service problem.
pub(crate) fn domain_error(err: Error) -> Response {
    let status = match &err {
        Error::InvalidSessionId(_) => StatusCode::BAD_REQUEST,
        Error::SessionNotFound(_) => StatusCode::NOT_FOUND,
        Error::SessionInactive(_) => StatusCode::CONFLICT,
        Error::Bus(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, err.to_string())
}
