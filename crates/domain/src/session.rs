//! Session identity and the session entity.
//!
//! A session is a logical conversation with a stable id, independent of any
//! particular transport connection. The registry owns the stored entities;
//! every other component refers to a session by id only.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SessionId
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Validated session identifier. Blank or whitespace-only ids never get past
/// construction, so downstream code can treat the inner string as non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Validate and wrap a raw session id.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(Error::InvalidSessionId(
                "session id cannot be empty".into(),
            ));
        }
        Ok(Self(value))
    }

    /// Synthesize a generated id of the form `sess-<n>`.
    pub fn generated(sequence: u64) -> Self {
        Self(format!("sess-{sequence}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A tracked conversation. Two sessions are the same conversation iff their
/// ids are equal; `active` tracks whether the conversation may accept new
/// requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a fresh, active session.
    pub fn new(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Flip the session back to active (reattach / re-create).
    pub fn activate(&mut self) {
        self.active = true;
        self.updated_at = Utc::now();
    }

    /// Mark the session closed. The record stays queryable.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_ids() {
        assert!(SessionId::new("").is_err());
        assert!(SessionId::new("   ").is_err());
        assert!(SessionId::new("\t\n").is_err());
    }

    #[test]
    fn accepts_non_blank_ids() {
        let id = SessionId::new("s1").unwrap();
        assert_eq!(id.as_str(), "s1");
    }

    #[test]
    fn generated_ids_use_sess_prefix() {
        assert_eq!(SessionId::generated(3).as_str(), "sess-3");
    }

    #[test]
    fn equality_is_by_value() {
        let a = SessionId::new("same").unwrap();
        let b = SessionId::new("same").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, SessionId::new("other").unwrap());
    }

    #[test]
    fn new_session_is_active() {
        let s = Session::new(SessionId::new("s1").unwrap());
        assert!(s.active);
        assert_eq!(s.created_at, s.updated_at);
    }

    #[test]
    fn deactivate_then_activate_bumps_updated_at() {
        let mut s = Session::new(SessionId::new("s1").unwrap());
        let created = s.created_at;
        s.deactivate();
        assert!(!s.active);
        s.activate();
        assert!(s.active);
        assert_eq!(s.created_at, created);
        assert!(s.updated_at >= created);
    }
}
