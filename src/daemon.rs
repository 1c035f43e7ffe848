//! The daemon's control loop.
//!
//! Everything runs on one task: each cycle scans tmux, then waits a bounded
//! time for a single client and serves it. The registry is written by the
//! scan and read by the request handler at disjoint points of the cycle,
//! so it needs no locking. Handling requests concurrently with scanning
//! would require putting it behind a lock first.

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::net::{UnixListener, UnixStream};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, info, warn};

use crate::config::DaemonConfig;
use crate::error::DaemonError;
use crate::scanner::SessionScanner;
use crate::server;
use crate::session::SessionRegistry;
use crate::tmux::{CommandRunner, PaneCaptureEngine, TmuxClient};

/// Cooperative shutdown request shared with signal handlers
///
/// The loop only looks at it between cycles, so a request takes effect
/// after the current scan and wait have finished.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal(Arc<AtomicBool>);

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Request shutdown on SIGINT or SIGTERM
    pub fn install_handlers(&self) -> io::Result<()> {
        let mut interrupt = signal(SignalKind::interrupt())?;
        let mut terminate = signal(SignalKind::terminate())?;
        let shutdown = self.clone();

        tokio::spawn(async move {
            let name = tokio::select! {
                _ = interrupt.recv() => "SIGINT",
                _ = terminate.recv() => "SIGTERM",
            };
            info!("received {}, shutting down after this cycle", name);
            shutdown.request();
        });
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    ShuttingDown,
}

pub struct Daemon<R> {
    config: DaemonConfig,
    scanner: SessionScanner<R>,
    registry: SessionRegistry,
    state: LoopState,
}

impl<R: CommandRunner> Daemon<R> {
    pub fn new(config: DaemonConfig, runner: R) -> Self {
        let client = TmuxClient::with_path(runner, config.tmux_path.clone());
        let engine = PaneCaptureEngine::new(config.exclude_title.clone());
        Self {
            scanner: SessionScanner::new(client, engine),
            registry: SessionRegistry::with_capacity(config.session_capacity),
            state: LoopState::Running,
            config,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Bind the socket and run cycles until shutdown is requested
    ///
    /// Only socket setup can fail. On a clean exit the socket file is
    /// removed.
    pub async fn run(&mut self, shutdown: &ShutdownSignal) -> Result<(), DaemonError> {
        self.state = LoopState::Running;
        let path = self.config.socket_path.clone();
        let listener = bind_socket(&path).await?;
        info!(socket = %path.display(), "muxgeist daemon listening");

        while self.state == LoopState::Running {
            if shutdown.is_requested() {
                self.state = LoopState::ShuttingDown;
                break;
            }
            self.run_cycle(&listener).await;
        }

        drop(listener);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(socket = %path.display(), "failed to remove socket: {}", e);
            }
        }
        info!(tracked = self.registry.len(), "muxgeist daemon stopped");
        Ok(())
    }

    async fn run_cycle(&mut self, listener: &UnixListener) {
        if let Err(e) = self.scanner.scan(&mut self.registry).await {
            warn!("session scan failed: {}", e);
        }

        match tokio::time::timeout(self.config.poll_interval, listener.accept()).await {
            Ok(Ok((stream, _))) => {
                if let Err(e) = server::handle_connection(stream, &self.registry).await {
                    warn!("failed to send response: {}", e);
                }
            }
            Ok(Err(e)) => warn!("accept failed: {}", e),
            Err(_) => {}
        }
    }
}

/// Bind the listening socket, clearing a stale socket file first
///
/// A socket file that still accepts connections belongs to a live daemon
/// and is left alone.
async fn bind_socket(path: &Path) -> Result<UnixListener, DaemonError> {
    if tokio::fs::symlink_metadata(path).await.is_ok() {
        if UnixStream::connect(path).await.is_ok() {
            return Err(DaemonError::AlreadyRunning(path.to_path_buf()));
        }
        tokio::fs::remove_file(path)
            .await
            .map_err(|source| DaemonError::StaleSocket {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(socket = %path.display(), "removed stale socket");
    }

    UnixListener::bind(path).map_err(|source| DaemonError::Bind {
        path: path.to_path_buf(),
        source,
    })
}
