//! Transient message shapes carried by the streaming bus.
//!
//! A [`RequestMessage`] lives on the request queue until the producer consumes
//! it; a [`ResultChunk`] lives on the broadcast result stream until the
//! dispatchers have seen it. Neither is ever persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::session::SessionId;

/// An inbound request bound for the producer.
#[derive(Debug, Clone, Serialize)]
pub struct RequestMessage {
    pub id: Uuid,
    pub session_id: SessionId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl RequestMessage {
    pub fn new(session_id: SessionId, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// One unit of incrementally produced output text.
///
/// For a given accepted request, chunks arrive in generation order and exactly
/// one carries `is_last = true`, always the final one.
#[derive(Debug, Clone, Serialize)]
pub struct ResultChunk {
    pub session_id: SessionId,
    pub chunk: String,
    pub is_last: bool,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

impl ResultChunk {
    pub fn new(session_id: SessionId, chunk: impl Into<String>, is_last: bool) -> Self {
        Self {
            session_id,
            chunk: chunk.into(),
            is_last,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_are_unique() {
        let sid = SessionId::new("s1").unwrap();
        let a = RequestMessage::new(sid.clone(), "hi");
        let b = RequestMessage::new(sid, "hi");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn chunk_serializes_wire_shape() {
        let chunk = ResultChunk::new(SessionId::new("s1").unwrap(), "chunk 1: hi", false);
        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["session_id"], "s1");
        assert_eq!(json["chunk"], "chunk 1: hi");
        assert_eq!(json["is_last"], false);
        assert!(json.get("created_at").is_none());
    }
}
