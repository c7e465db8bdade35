//! The send-message use case: validate the target session, then hand the
//! request to the bus.
//!
//! The error distinctions matter to callers: a blank id never reaches the
//! registry or the bus, an unknown session is "not found", and a closed
//! session is the separate, recoverable "not active" condition (the client
//! can re-create the session and retry).

use std::sync::Arc;

use rc_domain::error::{Error, Result};
use rc_domain::{RequestMessage, SessionId};
use rc_sessions::SessionRegistry;

use crate::bus::StreamingBus;

pub struct ChatService {
    registry: Arc<SessionRegistry>,
    bus: Arc<StreamingBus>,
}

impl ChatService {
    pub fn new(registry: Arc<SessionRegistry>, bus: Arc<StreamingBus>) -> Self {
        Self { registry, bus }
    }

    /// Publish `content` on behalf of `session_id`.
    ///
    /// Blocks while the request queue is full; once this returns `Ok` the
    /// request is accepted and will run to completion.
    pub async fn send_message(&self, session_id: &str, content: &str) -> Result<()> {
        let id = SessionId::new(session_id)?;

        let session = self
            .registry
            .get(&id)
            .ok_or_else(|| Error::SessionNotFound(id.as_str().to_owned()))?;
        if !session.active {
            return Err(Error::SessionInactive(id.as_str().to_owned()));
        }

        self.bus.publish(RequestMessage::new(id, content)).await
    }
}
