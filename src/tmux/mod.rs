mod capture;
mod client;
mod runner;

pub use capture::{PaneCaptureEngine, CAPACITY_RESERVE, NOISE_THRESHOLD};
pub use client::{TmuxClient, OUTPUT_CAPACITY};
pub use runner::{trim_trailing_newline, CommandRunner, ProcessRunner};

/// Title used when tmux reports a pane without one
pub const DEFAULT_PANE_TITLE: &str = "shell";

/// One line of `list-panes` output: `paneId:title:command`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneInfo {
    /// `window_index.pane_index`, e.g. "0.1"
    pub id: String,
    pub title: String,
    pub command: String,
}

impl PaneInfo {
    /// Split a listing line on its first two `:` separators
    ///
    /// Titles may themselves contain colons; everything after the second
    /// separator is the command. With only one separator the remainder is
    /// the title, and with none the whole line is the pane id.
    pub fn parse(line: &str) -> Self {
        let (id, rest) = match line.split_once(':') {
            Some((id, rest)) => (id, Some(rest)),
            None => (line, None),
        };

        let (title, command) = match rest {
            Some(rest) => match rest.split_once(':') {
                Some((title, command)) => (title, command),
                None => (rest, ""),
            },
            None => (DEFAULT_PANE_TITLE, ""),
        };

        Self {
            id: id.to_string(),
            title: title.to_string(),
            command: command.to_string(),
        }
    }
}
