//! muxgeist: tracks tmux session context and serves it over a Unix socket.

pub mod config;
pub mod daemon;
pub mod error;
pub mod scanner;
pub mod server;
pub mod session;
pub mod tmux;
