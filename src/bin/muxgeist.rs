//! muxgeist: one-shot client for the muxgeist daemon.
//!
//! Usage:
//!   muxgeist status          # Number of tracked sessions
//!   muxgeist list            # Tracked sessions and their working directories
//!   muxgeist context <name>  # Everything known about one session

use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use muxgeist::config::DEFAULT_SOCKET_PATH;
use muxgeist::server::protocol::Request;

#[derive(Debug, Parser)]
#[command(name = "muxgeist", version, about = "Query the muxgeist daemon")]
struct Cli {
    /// Daemon socket path
    #[arg(long, env = "MUXGEIST_SOCKET", default_value = DEFAULT_SOCKET_PATH)]
    socket: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Get daemon status
    Status,
    /// List tracked sessions
    List,
    /// Get context for a specific session
    Context { session: String },
}

impl From<Command> for Request {
    fn from(command: Command) -> Self {
        match command {
            Command::Status => Request::Status,
            Command::List => Request::List,
            Command::Context { session } => Request::Context(session),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let request = Request::from(cli.command);

    let response = send_request(&cli.socket, &request)?;
    println!("{}", response);
    Ok(())
}

fn send_request(socket: &Path, request: &Request) -> Result<String> {
    let mut stream = UnixStream::connect(socket)
        .with_context(|| format!("Daemon not running at {}", socket.display()))?;
    stream.set_read_timeout(Some(Duration::from_secs(10)))?;
    stream.set_write_timeout(Some(Duration::from_secs(5)))?;

    stream
        .write_all(request.encode().as_bytes())
        .context("Failed to send request")?;

    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .context("Failed to read response")?;
    Ok(response)
}
