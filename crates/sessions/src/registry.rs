//! Concurrency-safe in-memory session registry.
//!
//! Sessions are kept in a map behind a read/write lock: many concurrent
//! readers, exclusive writers, no torn reads. Entries are never removed
//! implicitly: `close` only flips the active flag, so a closed session's
//! history stays queryable until an explicit `delete`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use rc_domain::{Session, SessionId};

/// Registry of all known sessions, active and inactive.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Session>>,
    /// Monotonic sequence for generated ids. A plain `count + 1` would reuse
    /// ids after a delete, silently aliasing a new conversation onto an old
    /// one via the idempotent-create path.
    next_seq: AtomicU64,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(1),
        }
    }

    /// Create a session, or return / reactivate the existing one.
    ///
    /// With an explicit id: an active session with that id is returned
    /// unchanged (idempotent re-create); an inactive one is reactivated in
    /// place, keeping its identity and `created_at`. Without an id, a fresh
    /// `sess-<n>` id is synthesized.
    pub fn create(&self, id: Option<SessionId>) -> Session {
        let id = id.unwrap_or_else(|| {
            SessionId::generated(self.next_seq.fetch_add(1, Ordering::Relaxed))
        });

        let mut sessions = self.sessions.write();
        if let Some(existing) = sessions.get_mut(id.as_str()) {
            if !existing.active {
                existing.activate();
                tracing::info!(session_id = %id, "session reactivated");
            }
            return existing.clone();
        }

        let session = Session::new(id.clone());
        sessions.insert(id.as_str().to_owned(), session.clone());
        tracing::info!(session_id = %id, "session created");
        session
    }

    /// Raw lookup: returns whatever is stored, active or not.
    pub fn get(&self, id: &SessionId) -> Option<Session> {
        self.sessions.read().get(id.as_str()).cloned()
    }

    /// Conversational lookup: a closed session reads as absent.
    pub fn get_active(&self, id: &SessionId) -> Option<Session> {
        self.sessions
            .read()
            .get(id.as_str())
            .filter(|s| s.active)
            .cloned()
    }

    /// Mark a session inactive. No-op (not an error) if the id is unknown.
    pub fn close(&self, id: &SessionId) {
        if let Some(session) = self.sessions.write().get_mut(id.as_str()) {
            session.deactivate();
            tracing::info!(session_id = %id, "session closed");
        }
    }

    /// Remove a session entirely. No-op if the id is unknown.
    pub fn delete(&self, id: &SessionId) {
        if self.sessions.write().remove(id.as_str()).is_some() {
            tracing::info!(session_id = %id, "session deleted");
        }
    }

    /// Number of stored sessions, active and inactive.
    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Snapshot of all stored sessions. Order is unspecified.
    pub fn list(&self) -> Vec<Session> {
        self.sessions.read().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn sid(s: &str) -> SessionId {
        SessionId::new(s).unwrap()
    }

    #[test]
    fn create_then_get_roundtrip() {
        let reg = SessionRegistry::new();
        let created = reg.create(Some(sid("s1")));
        assert!(created.active);

        let fetched = reg.get(&sid("s1")).unwrap();
        assert_eq!(fetched.id, created.id);
        assert!(fetched.active);
    }

    #[test]
    fn create_without_id_generates_sequence() {
        let reg = SessionRegistry::new();
        let a = reg.create(None);
        let b = reg.create(None);
        assert_eq!(a.id.as_str(), "sess-1");
        assert_eq!(b.id.as_str(), "sess-2");
        assert_eq!(reg.count(), 2);
    }

    #[test]
    fn generated_ids_survive_deletes() {
        let reg = SessionRegistry::new();
        let a = reg.create(None);
        reg.create(None);
        reg.delete(&a.id);
        // The sequence keeps advancing; a deleted id is never reissued.
        let c = reg.create(None);
        assert_eq!(c.id.as_str(), "sess-3");
    }

    #[test]
    fn create_is_idempotent_for_active_sessions() {
        let reg = SessionRegistry::new();
        let first = reg.create(Some(sid("s1")));
        let second = reg.create(Some(sid("s1")));
        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(reg.count(), 1);
    }

    #[test]
    fn close_hides_from_active_lookup_but_not_raw() {
        let reg = SessionRegistry::new();
        reg.create(Some(sid("s1")));
        reg.close(&sid("s1"));

        assert!(reg.get_active(&sid("s1")).is_none());
        let raw = reg.get(&sid("s1")).unwrap();
        assert!(!raw.active);
    }

    #[test]
    fn create_reactivates_closed_session() {
        let reg = SessionRegistry::new();
        let original = reg.create(Some(sid("s1")));
        reg.close(&sid("s1"));

        let revived = reg.create(Some(sid("s1")));
        assert!(revived.active);
        assert_eq!(revived.id, original.id);
        assert_eq!(revived.created_at, original.created_at);
        assert!(revived.updated_at >= original.updated_at);
        assert_eq!(reg.count(), 1);
    }

    #[test]
    fn close_and_delete_unknown_ids_are_noops() {
        let reg = SessionRegistry::new();
        reg.close(&sid("ghost"));
        reg.delete(&sid("ghost"));
        assert!(reg.is_empty());
    }

    #[test]
    fn list_snapshots_all_sessions() {
        let reg = SessionRegistry::new();
        reg.create(Some(sid("a")));
        reg.create(Some(sid("b")));
        reg.close(&sid("b"));

        let all = reg.list();
        assert_eq!(all.len(), 2);
        assert_eq!(all.iter().filter(|s| s.active).count(), 1);
    }

    #[test]
    fn concurrent_create_and_close_keep_one_entry_per_id() {
        let reg = Arc::new(SessionRegistry::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let reg = reg.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..100 {
                    let id = sid(&format!("s{}", i % 10));
                    reg.create(Some(id.clone()));
                    if i % 3 == 0 {
                        reg.close(&id);
                    }
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(reg.count(), 10);
    }
}
