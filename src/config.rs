use std::path::PathBuf;
use std::time::Duration;

use crate::session::SESSION_CAPACITY;

/// Well-known socket path shared by the daemon and its clients
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/muxgeist.sock";

/// Pane title marking the daemon's own UI pane
pub const DEFAULT_EXCLUDE_TITLE: &str = "muxgeist";

pub const DEFAULT_INTERVAL_MS: u64 = 2000;

/// Runtime settings for the daemon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    pub socket_path: PathBuf,
    /// Upper bound on how long each cycle waits for a client
    pub poll_interval: Duration,
    pub tmux_path: String,
    /// Panes whose title contains this are not captured
    pub exclude_title: String,
    pub session_capacity: usize,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            poll_interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            tmux_path: "tmux".to_string(),
            exclude_title: DEFAULT_EXCLUDE_TITLE.to_string(),
            session_capacity: SESSION_CAPACITY,
        }
    }
}
