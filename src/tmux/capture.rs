use tracing::{debug, warn};

use super::client::TmuxClient;
use super::runner::CommandRunner;
use crate::config::DEFAULT_EXCLUDE_TITLE;
use crate::error::ExternalCommandError;
use crate::session::{ScrollbackBuffer, SCROLLBACK_CAPACITY};

/// Captures of this many bytes or fewer are treated as empty panes
pub const NOISE_THRESHOLD: usize = 10;

/// Stop adding panes once less than this much room is left
pub const CAPACITY_RESERVE: usize = 500;

/// Builds a session's scrollback from the content of its panes
#[derive(Debug, Clone)]
pub struct PaneCaptureEngine {
    /// Panes whose title contains this are the daemon's own UI and skipped
    exclude_title: String,
    capacity: usize,
}

impl PaneCaptureEngine {
    pub fn new(exclude_title: impl Into<String>) -> Self {
        Self {
            exclude_title: exclude_title.into(),
            capacity: SCROLLBACK_CAPACITY,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    fn is_excluded(&self, title: &str) -> bool {
        !self.exclude_title.is_empty() && title.contains(self.exclude_title.as_str())
    }

    /// Capture every pane of `session` into a fresh buffer
    ///
    /// Each kept pane is preceded by a `=== PANE <id> (<title>) ===` header.
    /// If the session lists no panes, or none of them yields meaningful
    /// content, the buffer holds the active pane's content instead.
    ///
    /// Only a failure to list the panes is returned; a pane that cannot be
    /// captured is skipped.
    pub async fn capture<R: CommandRunner>(
        &self,
        client: &TmuxClient<R>,
        session: &str,
    ) -> Result<ScrollbackBuffer, ExternalCommandError> {
        let panes = client.list_panes(session).await?;
        let mut buffer = ScrollbackBuffer::new(self.capacity);

        if panes.is_empty() {
            self.capture_active(client, session, &mut buffer).await;
            return Ok(buffer);
        }

        let mut captured = 0usize;
        for pane in &panes {
            if buffer.remaining() < CAPACITY_RESERVE {
                debug!(session, len = buffer.len(), "scrollback nearly full, skipping remaining panes");
                break;
            }
            if self.is_excluded(&pane.title) {
                debug!(session, pane = %pane.id, "skipping own pane");
                continue;
            }

            let target = format!("{}:{}", session, pane.id);
            let content = match client.capture_pane(&target).await {
                Ok(content) => content,
                Err(e) => {
                    warn!(%target, "pane capture failed: {}", e);
                    continue;
                }
            };
            if content.len() <= NOISE_THRESHOLD {
                continue;
            }

            let header = format!("\n=== PANE {} ({}) ===\n", pane.id, pane.title);
            if !buffer.push_whole(&header) {
                debug!(%target, "pane header does not fit, skipping pane");
                continue;
            }
            let written = buffer.push_truncated(&content);
            if written < content.len() {
                debug!(%target, dropped = content.len() - written, "pane content truncated");
            }
            captured += 1;
        }

        if captured == 0 {
            debug!(session, "no pane yielded content, capturing active pane");
            self.capture_active(client, session, &mut buffer).await;
        }

        Ok(buffer)
    }

    async fn capture_active<R: CommandRunner>(
        &self,
        client: &TmuxClient<R>,
        session: &str,
        buffer: &mut ScrollbackBuffer,
    ) {
        match client.capture_pane(session).await {
            Ok(content) => buffer.replace(&content),
            Err(e) => {
                warn!(session, "active pane capture failed: {}", e);
                buffer.clear();
            }
        }
    }
}

impl Default for PaneCaptureEngine {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDE_TITLE)
    }
}
