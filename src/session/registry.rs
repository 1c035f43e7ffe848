use chrono::Utc;
use tracing::debug;

use super::SessionContext;

/// Maximum number of sessions tracked at once
pub const SESSION_CAPACITY: usize = 32;

/// Append-only table of tracked sessions
///
/// Sessions are never removed: one that disappears from tmux stays
/// queryable with its last known state. When the table is full, unseen
/// sessions are ignored.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: Vec<SessionContext>,
    capacity: usize,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::with_capacity(SESSION_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.sessions.len() >= self.capacity
    }

    /// Sessions in discovery order
    pub fn iter(&self) -> impl Iterator<Item = &SessionContext> {
        self.sessions.iter()
    }

    fn position(&self, session_id: &str) -> Option<usize> {
        self.sessions
            .iter()
            .position(|s| s.session_id() == session_id)
    }

    pub fn find(&self, session_id: &str) -> Option<&SessionContext> {
        self.position(session_id).map(|i| &self.sessions[i])
    }

    /// Get the session with this id, tracking it first if it is new
    ///
    /// Returns `None` only when the id is unseen and the registry is full.
    pub fn create_if_absent(&mut self, session_id: &str) -> Option<&mut SessionContext> {
        if let Some(i) = self.position(session_id) {
            return Some(&mut self.sessions[i]);
        }
        if self.is_full() {
            debug!(session_id, capacity = self.capacity, "registry full, dropping session");
            return None;
        }
        self.sessions.push(SessionContext::new(session_id, Utc::now()));
        self.sessions.last_mut()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
