//! SSE egress: the per-session result stream.
//!
//! - `GET /sse/:session_id` — subscribe to a session's chunks
//!
//! Each open stream owns one dispatcher. The stream stays open after the
//! final chunk of a response (the session may issue further requests) and
//! closes when the client disconnects or the bus shuts down.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures_util::stream::Stream;

use rc_domain::SessionId;

use crate::api::{api_error, domain_error};
use crate::bus::{Dispatcher, Subscription};
use crate::state::AppState;

/// Open the event stream for one session.
///
/// Subscribing to an unknown session is refused; the caller should create
/// the session (or connect over `/ws`) first.
pub async fn session_events(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let id = match SessionId::new(session_id) {
        Ok(id) => id,
        Err(e) => return domain_error(e),
    };
    if state.registry.get(&id).is_none() {
        return api_error(
            StatusCode::NOT_FOUND,
            format!("session not found: {id}"),
        );
    }

    let subscription = Dispatcher::attach(
        &state.bus,
        id.clone(),
        state.config.stream.dispatch_buffer_capacity,
    );
    tracing::info!(session_id = %id, "event stream opened");

    Sse::new(make_event_stream(id, subscription))
        .keep_alive(KeepAlive::default())
        .into_response()
}

fn make_event_stream(
    session_id: SessionId,
    mut subscription: Subscription,
) -> impl Stream<Item = Result<Event, std::convert::Infallible>> {
    async_stream::stream! {
        yield Ok(Event::default()
            .event("connected")
            .data(serde_json::json!({ "session_id": session_id }).to_string()));

        while let Some(chunk) = subscription.recv().await {
            let data = serde_json::json!({
                "chunk": chunk.chunk,
                "is_last": chunk.is_last,
            });
            yield Ok(Event::default().event("message").data(data.to_string()));
        }

        // The bus is gone; tell the client instead of silently stalling.
        tracing::info!(session_id = %session_id, "event stream ended");
        yield Ok(Event::default()
            .event("end")
            .data(r#"{"message":"stream ended"}"#));
    }
}
