use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to run an external program such as tmux
///
/// A non-zero exit status is not an error at this level; callers inspect
/// the captured output instead.
#[derive(Debug, Error)]
pub enum ExternalCommandError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to read output of `{program}`: {source}")]
    Read {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Fatal errors raised while setting up or tearing down the daemon socket
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("another daemon is already listening on {}", .0.display())]
    AlreadyRunning(PathBuf),

    #[error("failed to remove stale socket {}: {source}", path.display())]
    StaleSocket {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to bind {}: {source}", path.display())]
    Bind {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
