use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use muxgeist::config::{
    DaemonConfig, DEFAULT_EXCLUDE_TITLE, DEFAULT_INTERVAL_MS, DEFAULT_SOCKET_PATH,
};
use muxgeist::daemon::{Daemon, ShutdownSignal};
use muxgeist::session::SESSION_CAPACITY;
use muxgeist::tmux::ProcessRunner;

/// Track tmux session context and serve it over a Unix socket
#[derive(Debug, Parser)]
#[command(name = "muxgeistd", version)]
struct Args {
    /// Socket path to listen on
    #[arg(long, env = "MUXGEIST_SOCKET", default_value = DEFAULT_SOCKET_PATH)]
    socket: PathBuf,

    /// Maximum wait for a client between scans, in milliseconds
    #[arg(long, env = "MUXGEIST_INTERVAL_MS", default_value_t = DEFAULT_INTERVAL_MS)]
    interval_ms: u64,

    /// tmux binary to run
    #[arg(long, env = "MUXGEIST_TMUX", default_value = "tmux")]
    tmux: String,

    /// Skip panes whose title contains this text
    #[arg(long, env = "MUXGEIST_EXCLUDE_TITLE", default_value = DEFAULT_EXCLUDE_TITLE)]
    exclude_title: String,
}

impl Args {
    fn into_config(self) -> DaemonConfig {
        DaemonConfig {
            socket_path: self.socket,
            poll_interval: Duration::from_millis(self.interval_ms),
            tmux_path: self.tmux,
            exclude_title: self.exclude_title,
            session_capacity: SESSION_CAPACITY,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing::Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Args::parse().into_config();
    tracing::info!(?config, "starting muxgeist daemon");

    let shutdown = ShutdownSignal::new();
    shutdown
        .install_handlers()
        .context("Failed to install signal handlers")?;

    let mut daemon = Daemon::new(config, ProcessRunner);
    daemon
        .run(&shutdown)
        .await
        .context("Failed to set up daemon socket")?;

    Ok(())
}
