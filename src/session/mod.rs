mod buffer;
mod history;
mod registry;

pub(crate) use buffer::floor_char_boundary;
pub use buffer::ScrollbackBuffer;
pub use history::{CommandHistory, CommandRecord, HISTORY_CAPACITY};
pub use registry::{SessionRegistry, SESSION_CAPACITY};

use chrono::{DateTime, Utc};

/// Bytes of pane content kept per session
pub const SCROLLBACK_CAPACITY: usize = 16 * 1024;

/// Last observed state of one tmux session
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// tmux session name; never changes once tracked
    session_id: String,
    /// Working directory of the active pane at the last refresh
    pub current_cwd: String,
    /// Active pane id at the last refresh
    pub current_pane: String,
    last_activity: DateTime<Utc>,
    /// Pane captures from the last refresh
    pub scrollback: ScrollbackBuffer,
    /// Not populated yet
    pub command_history: CommandHistory,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.into(),
            current_cwd: String::new(),
            current_pane: String::new(),
            last_activity: now,
            scrollback: ScrollbackBuffer::new(SCROLLBACK_CAPACITY),
            command_history: CommandHistory::default(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Record a refresh. A clock that steps backwards never moves the
    /// timestamp back.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_activity {
            self.last_activity = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_context_is_empty() {
        let now = Utc::now();
        let ctx = SessionContext::new("main", now);
        assert_eq!(ctx.session_id(), "main");
        assert_eq!(ctx.current_cwd, "");
        assert_eq!(ctx.current_pane, "");
        assert_eq!(ctx.last_activity(), now);
        assert!(ctx.scrollback.is_empty());
        assert_eq!(ctx.scrollback.capacity(), SCROLLBACK_CAPACITY);
        assert!(ctx.command_history.is_empty());
    }

    #[test]
    fn test_touch_is_monotonic() {
        let start = Utc::now();
        let mut ctx = SessionContext::new("main", start);

        let later = start + Duration::seconds(5);
        ctx.touch(later);
        assert_eq!(ctx.last_activity(), later);

        ctx.touch(start);
        assert_eq!(ctx.last_activity(), later);
    }
}
