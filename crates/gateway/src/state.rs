use std::sync::Arc;

use rc_domain::config::Config;
use rc_sessions::SessionRegistry;

use crate::bus::StreamingBus;
use crate::chat::ChatService;

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Owner of all session records; every component references sessions by id.
    pub registry: Arc<SessionRegistry>,
    /// Request queue + producer loop + broadcast result stream.
    pub bus: Arc<StreamingBus>,
    /// The send-message use case (validation, liveness check, publish).
    pub chat: Arc<ChatService>,
}
