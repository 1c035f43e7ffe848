use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::ExternalCommandError;
use crate::session::{SessionContext, SessionRegistry};
use crate::tmux::{CommandRunner, PaneCaptureEngine, TmuxClient};

/// Reconciles the registry with the sessions tmux currently reports
pub struct SessionScanner<R> {
    client: TmuxClient<R>,
    engine: PaneCaptureEngine,
}

impl<R: CommandRunner> SessionScanner<R> {
    pub fn new(client: TmuxClient<R>, engine: PaneCaptureEngine) -> Self {
        Self { client, engine }
    }

    /// Run one scan cycle and return how many sessions were refreshed
    ///
    /// Unseen sessions are added to the registry (or dropped if it is full)
    /// and every listed session that is tracked gets refreshed. Tracked
    /// sessions missing from the listing are left as they are.
    pub async fn scan(&self, registry: &mut SessionRegistry) -> Result<usize, ExternalCommandError> {
        let names = self.client.list_session_names().await?;

        let mut refreshed = 0;
        for name in &names {
            let is_new = registry.find(name).is_none();
            let Some(session) = registry.create_if_absent(name) else {
                continue;
            };
            if is_new {
                info!(session = %name, "discovered new tmux session");
            }
            self.refresh(session).await;
            refreshed += 1;
        }

        debug!(listed = names.len(), refreshed, tracked = registry.len(), "scan complete");
        Ok(refreshed)
    }

    /// Update cwd, active pane and scrollback of one session
    ///
    /// Each query is independent; one that fails keeps the previous value.
    async fn refresh(&self, session: &mut SessionContext) {
        let id = session.session_id().to_string();

        match self.client.active_pane_id(&id).await {
            Ok(pane) if !pane.is_empty() => session.current_pane = pane,
            Ok(_) => debug!(session = %id, "no active pane reported"),
            Err(e) => warn!(session = %id, "failed to query active pane: {}", e),
        }

        match self.client.current_path(&id).await {
            Ok(cwd) if !cwd.is_empty() => session.current_cwd = cwd,
            Ok(_) => debug!(session = %id, "no working directory reported"),
            Err(e) => warn!(session = %id, "failed to query working directory: {}", e),
        }

        match self.engine.capture(&self.client, &id).await {
            Ok(scrollback) => session.scrollback = scrollback,
            Err(e) => warn!(session = %id, "failed to list panes: {}", e),
        }

        session.touch(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tmux::testing::FakeRunner;

    fn scanner(runner: FakeRunner) -> SessionScanner<FakeRunner> {
        SessionScanner::new(TmuxClient::new(runner), PaneCaptureEngine::default())
    }

    fn main_session() -> FakeRunner {
        FakeRunner::new()
            .sessions("main")
            .active_pane("main", "%1")
            .cwd("main", "/home/u")
            .panes("main", "0.0:zsh:zsh")
            .capture("main:0.0", "$ make test\nall tests passed")
    }

    #[tokio::test]
    async fn test_scan_discovers_and_refreshes() {
        let mut registry = SessionRegistry::new();
        let refreshed = scanner(main_session()).scan(&mut registry).await.unwrap();

        assert_eq!(refreshed, 1);
        let session = registry.find("main").unwrap();
        assert_eq!(session.current_pane, "%1");
        assert_eq!(session.current_cwd, "/home/u");
        assert!(session.scrollback.as_str().contains("all tests passed"));
    }

    #[tokio::test]
    async fn test_scan_refreshes_existing_sessions_in_place() {
        let mut registry = SessionRegistry::new();
        registry.create_if_absent("main").unwrap().current_cwd = "/old".to_string();
        let before = registry.find("main").unwrap().last_activity();

        scanner(main_session()).scan(&mut registry).await.unwrap();

        let session = registry.find("main").unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(session.current_cwd, "/home/u");
        assert!(session.last_activity() >= before);
    }

    #[tokio::test]
    async fn test_scrollback_is_replaced_not_appended() {
        let mut registry = SessionRegistry::new();
        let scanner = scanner(main_session());
        scanner.scan(&mut registry).await.unwrap();
        let first = registry.find("main").unwrap().scrollback.clone();

        scanner.scan(&mut registry).await.unwrap();
        assert_eq!(registry.find("main").unwrap().scrollback, first);
    }

    #[tokio::test]
    async fn test_failed_queries_keep_previous_values() {
        let mut registry = SessionRegistry::new();
        {
            let session = registry.create_if_absent("main").unwrap();
            session.current_pane = "%7".to_string();
            session.current_cwd = "/srv".to_string();
            session.scrollback.push_truncated("previous capture");
        }

        let runner = FakeRunner::new()
            .sessions("main")
            .fail(&["display-message", "-t", "main", "-p", "#{pane_id}"])
            .fail_panes("main");
        scanner(runner).scan(&mut registry).await.unwrap();

        let session = registry.find("main").unwrap();
        assert_eq!(session.current_pane, "%7");
        // tmux printed nothing for the cwd query
        assert_eq!(session.current_cwd, "/srv");
        assert_eq!(session.scrollback.as_str(), "previous capture");
    }

    #[tokio::test]
    async fn test_vanished_sessions_are_retained() {
        let mut registry = SessionRegistry::new();
        registry.create_if_absent("old").unwrap().current_cwd = "/gone".to_string();

        scanner(main_session()).scan(&mut registry).await.unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find("old").unwrap().current_cwd, "/gone");
    }

    #[tokio::test]
    async fn test_sessions_beyond_capacity_are_dropped() {
        let mut registry = SessionRegistry::with_capacity(2);
        let runner = FakeRunner::new().sessions("a\nb\nc");
        let refreshed = scanner(runner).scan(&mut registry).await.unwrap();

        assert_eq!(refreshed, 2);
        assert_eq!(registry.len(), 2);
        assert!(registry.find("c").is_none());
    }

    #[tokio::test]
    async fn test_unavailable_tmux_fails_the_cycle() {
        let mut registry = SessionRegistry::new();
        registry.create_if_absent("main");

        let result = scanner(FakeRunner::unavailable()).scan(&mut registry).await;
        assert!(result.is_err());
        assert_eq!(registry.len(), 1);
    }
}
