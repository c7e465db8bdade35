//! Session management API endpoints.
//!
//! - `POST   /v1/sessions`            — create (or reattach) a session
//! - `GET    /v1/sessions`            — list all sessions
//! - `GET    /v1/sessions/:id`        — raw lookup, active or not
//! - `POST   /v1/sessions/:id/close`  — mark inactive
//! - `DELETE /v1/sessions/:id`        — remove entirely

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use rc_domain::{Session, SessionId};

use crate::api::{api_error, domain_error};
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/sessions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct CreateSessionBody {
    /// Explicit session id. If absent, one is generated (`sess-<n>`).
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Create a session, reactivating an existing id if it was closed.
///
/// 201 for a brand-new record, 200 when the id already existed (idempotent
/// re-create / reactivation).
pub async fn create_session(
    State(state): State<AppState>,
    Json(body): Json<CreateSessionBody>,
) -> Response {
    let requested = match body.session_id.map(SessionId::new).transpose() {
        Ok(id) => id,
        Err(e) => return domain_error(e),
    };

    let existed = requested
        .as_ref()
        .is_some_and(|id| state.registry.get(id).is_some());
    let session = state.registry.create(requested);

    let status = if existed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    (status, Json(session_json(&session))).into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /v1/sessions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// List all stored sessions, active and inactive.
pub async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    let sessions: Vec<_> = state.registry.list().iter().map(session_json).collect();
    Json(serde_json::json!({
        "sessions": sessions,
        "count": sessions.len(),
    }))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /v1/sessions/:id
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Raw lookup: a closed session is still returned (with `active: false`);
/// only a truly unknown id is 404.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let id = match SessionId::new(id) {
        Ok(id) => id,
        Err(e) => return domain_error(e),
    };
    match state.registry.get(&id) {
        Some(session) => Json(session_json(&session)).into_response(),
        None => api_error(
            StatusCode::NOT_FOUND,
            format!("session not found: {id}"),
        ),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/sessions/:id/close
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Mark a session inactive. Closing an unknown or already-closed session is
/// a no-op, not an error.
pub async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let id = match SessionId::new(id) {
        Ok(id) => id,
        Err(e) => return domain_error(e),
    };
    state.registry.close(&id);
    Json(serde_json::json!({ "session_id": id, "closed": true })).into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DELETE /v1/sessions/:id
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Remove a session record entirely.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let id = match SessionId::new(id) {
        Ok(id) => id,
        Err(e) => return domain_error(e),
    };
    state.registry.delete(&id);
    StatusCode::NO_CONTENT.into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn session_json(session: &Session) -> serde_json::Value {
    serde_json::json!({
        "session_id": session.id,
        "active": session.active,
        "created_at": session.created_at.to_rfc3339(),
        "updated_at": session.updated_at.to_rfc3339(),
    })
}
