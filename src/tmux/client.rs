use tracing::debug;

use super::runner::CommandRunner;
use super::PaneInfo;
use crate::error::ExternalCommandError;

/// Upper bound on the bytes read from any single tmux invocation
pub const OUTPUT_CAPACITY: usize = 16 * 1024;

pub(crate) const SESSION_FORMAT: &str = "#{session_name}";
pub(crate) const PANE_FORMAT: &str =
    "#{window_index}.#{pane_index}:#{pane_title}:#{pane_current_command}";

/// Client for querying tmux via its CLI
pub struct TmuxClient<R> {
    runner: R,
    /// Path to tmux binary
    tmux_path: String,
}

impl<R: CommandRunner> TmuxClient<R> {
    pub fn new(runner: R) -> Self {
        Self::with_path(runner, "tmux")
    }

    pub fn with_path(runner: R, tmux_path: impl Into<String>) -> Self {
        Self {
            runner,
            tmux_path: tmux_path.into(),
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    async fn query(&self, args: &[&str]) -> Result<String, ExternalCommandError> {
        self.runner.run(&self.tmux_path, args, OUTPUT_CAPACITY).await
    }

    /// Names of every session on the tmux server
    ///
    /// With no server running tmux prints nothing on stdout, which comes
    /// back as an empty list.
    pub async fn list_session_names(&self) -> Result<Vec<String>, ExternalCommandError> {
        let output = self.query(&["list-sessions", "-F", SESSION_FORMAT]).await?;
        Ok(output
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Pane topology of one session
    pub async fn list_panes(&self, session: &str) -> Result<Vec<PaneInfo>, ExternalCommandError> {
        let output = self
            .query(&["list-panes", "-t", session, "-F", PANE_FORMAT])
            .await?;
        let panes: Vec<PaneInfo> = output
            .lines()
            .filter(|line| !line.is_empty())
            .map(PaneInfo::parse)
            .collect();
        debug!(session, panes = panes.len(), "listed panes");
        Ok(panes)
    }

    /// Id of the session's active pane, e.g. "%3"
    pub async fn active_pane_id(&self, session: &str) -> Result<String, ExternalCommandError> {
        self.query(&["display-message", "-t", session, "-p", "#{pane_id}"])
            .await
    }

    /// Working directory of the session's active pane
    pub async fn current_path(&self, session: &str) -> Result<String, ExternalCommandError> {
        self.query(&["display-message", "-t", session, "-p", "#{pane_current_path}"])
            .await
    }

    /// Visible content of a pane. `target` is either a session name, which
    /// selects its active pane, or `session:window.pane`.
    pub async fn capture_pane(&self, target: &str) -> Result<String, ExternalCommandError> {
        self.query(&["capture-pane", "-t", target, "-p"]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tmux::testing::FakeRunner;

    #[tokio::test]
    async fn test_list_session_names() {
        let client = TmuxClient::new(FakeRunner::new().sessions("main\nwork\n\nscratch"));
        let names = client.list_session_names().await.unwrap();
        assert_eq!(names, vec!["main", "work", "scratch"]);
    }

    #[tokio::test]
    async fn test_no_server_yields_no_sessions() {
        let client = TmuxClient::new(FakeRunner::new());
        assert!(client.list_session_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_panes_parses_each_line() {
        let client = TmuxClient::new(
            FakeRunner::new().panes("main", "0.0:zsh:zsh\n0.1:muxgeist:python3"),
        );
        let panes = client.list_panes("main").await.unwrap();
        assert_eq!(panes.len(), 2);
        assert_eq!(panes[1].title, "muxgeist");
        assert_eq!(panes[1].command, "python3");
    }

    #[tokio::test]
    async fn test_session_name_passed_as_single_argument() {
        let client = TmuxClient::new(FakeRunner::new());
        client.capture_pane("evil; rm -rf ~:0.0").await.unwrap();
        assert_eq!(
            client.runner().calls(),
            vec![vec!["capture-pane", "-t", "evil; rm -rf ~:0.0", "-p"]]
        );
    }

    #[tokio::test]
    async fn test_spawn_failure_propagates() {
        let client = TmuxClient::new(FakeRunner::unavailable());
        assert!(client.active_pane_id("main").await.is_err());
        assert!(client.list_session_names().await.is_err());
    }
}
