use std::process::Stdio;

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::ExternalCommandError;
use crate::session::floor_char_boundary;

/// Capability to run an external program and capture what it prints
///
/// Implementations read at most `capacity` bytes of standard output and
/// return text no longer than that, minus one trailing newline. Output
/// beyond `capacity` is dropped silently.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        capacity: usize,
    ) -> Result<String, ExternalCommandError>;
}

/// Runs programs as child processes
///
/// Arguments are handed to the OS as a plain argv, so session and pane
/// names coming back from tmux are never interpreted by a shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        capacity: usize,
    ) -> Result<String, ExternalCommandError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExternalCommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let mut output = Vec::with_capacity(capacity.min(8 * 1024));
        if let Some(stdout) = child.stdout.take() {
            stdout
                .take(capacity as u64)
                .read_to_end(&mut output)
                .await
                .map_err(|source| ExternalCommandError::Read {
                    program: program.to_string(),
                    source,
                })?;
        }

        // The pipe is closed at this point. A child that still has output
        // pending would otherwise block forever on a full pipe.
        if output.len() >= capacity {
            let _ = child.start_kill();
        }
        match child.wait().await {
            Ok(status) if !status.success() => {
                debug!(program, ?args, %status, "external command exited unsuccessfully");
            }
            Ok(_) => {}
            Err(e) => debug!(program, "failed to reap child: {}", e),
        }

        // Replacement characters for invalid bytes can make the decoded
        // text longer than what was read.
        let mut text = String::from_utf8_lossy(&output).into_owned();
        clip_to_capacity(&mut text, capacity);
        Ok(trim_trailing_newline(text))
    }
}

fn clip_to_capacity(text: &mut String, capacity: usize) {
    let cut = floor_char_boundary(text, capacity);
    text.truncate(cut);
}

/// Strip exactly one trailing `\n`, if present
pub fn trim_trailing_newline(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
    }
    text
}
