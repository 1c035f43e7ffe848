//! Text protocol spoken over the daemon socket.
//!
//! A client sends one request in a single write and reads until the daemon
//! closes the connection:
//!
//! | request          | response                            |
//! |------------------|-------------------------------------|
//! | `status`         | `OK: <N> sessions tracked`          |
//! | `list`           | one `<id> (<cwd>)` line per session |
//! | `context:<id>`   | field dump, or `ERROR: Session not found` |
//! | anything else    | `ERROR: Unknown command`            |

use std::fmt::Write;

use crate::session::{SessionContext, SessionRegistry};

/// Bytes read from a client in its single request read
pub const REQUEST_CAPACITY: usize = 8 * 1024;

pub const SESSION_NOT_FOUND: &str = "ERROR: Session not found";
pub const UNKNOWN_COMMAND: &str = "ERROR: Unknown command";

const CONTEXT_PREFIX: &str = "context:";

/// A parsed client request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Status,
    List,
    Context(String),
    Unknown(String),
}

impl Request {
    /// Parse raw request text. One trailing line terminator is ignored so
    /// that `echo status | nc -U` works as well as the bundled client.
    pub fn parse(raw: &str) -> Self {
        let line = raw
            .strip_suffix('\n')
            .map(|s| s.strip_suffix('\r').unwrap_or(s))
            .unwrap_or(raw);

        match line {
            "status" => Request::Status,
            "list" => Request::List,
            _ => match line.strip_prefix(CONTEXT_PREFIX) {
                Some(id) => Request::Context(id.to_string()),
                None => Request::Unknown(line.to_string()),
            },
        }
    }

    /// Wire form of the request, as sent by clients
    pub fn encode(&self) -> String {
        match self {
            Request::Status => "status".to_string(),
            Request::List => "list".to_string(),
            Request::Context(id) => format!("{CONTEXT_PREFIX}{id}"),
            Request::Unknown(raw) => raw.clone(),
        }
    }
}

/// Build the response text for `request` against the current registry
pub fn respond(request: &Request, registry: &SessionRegistry) -> String {
    match request {
        Request::Status => format!("OK: {} sessions tracked", registry.len()),
        Request::List => {
            let mut out = String::new();
            for session in registry.iter() {
                let _ = writeln!(out, "{} ({})", session.session_id(), session.current_cwd);
            }
            out
        }
        Request::Context(id) => match registry.find(id) {
            Some(session) => context_dump(session),
            None => SESSION_NOT_FOUND.to_string(),
        },
        Request::Unknown(_) => UNKNOWN_COMMAND.to_string(),
    }
}

fn context_dump(session: &SessionContext) -> String {
    format!(
        "Session: {}\nCWD: {}\nPane: {}\nLast Activity: {}\nScrollback Length: {}\nScrollback:\n{}\n",
        session.session_id(),
        session.current_cwd,
        session.current_pane,
        session.last_activity().timestamp(),
        session.scrollback.len(),
        session.scrollback.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_main() -> SessionRegistry {
        let mut registry = SessionRegistry::new();
        let session = registry.create_if_absent("main").unwrap();
        session.current_cwd = "/home/u".to_string();
        session.current_pane = "%2".to_string();
        session.scrollback.push_truncated("$ ls\nsrc");
        registry
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Request::parse("status"), Request::Status);
        assert_eq!(Request::parse("list"), Request::List);
        assert_eq!(
            Request::parse("context:main"),
            Request::Context("main".to_string())
        );
        assert_eq!(Request::parse("bogus"), Request::Unknown("bogus".to_string()));
    }

    #[test]
    fn test_parse_tolerates_one_line_terminator() {
        assert_eq!(Request::parse("status\n"), Request::Status);
        assert_eq!(Request::parse("list\r\n"), Request::List);
        assert_eq!(
            Request::parse("context:main\n"),
            Request::Context("main".to_string())
        );
        assert!(matches!(Request::parse("status\n\n"), Request::Unknown(_)));
        assert!(matches!(Request::parse(" status"), Request::Unknown(_)));
    }

    #[test]
    fn test_context_id_keeps_colons() {
        assert_eq!(
            Request::parse("context:a:b"),
            Request::Context("a:b".to_string())
        );
    }

    #[test]
    fn test_encode() {
        assert_eq!(Request::Context("main".to_string()).encode(), "context:main");
        assert_eq!(Request::Status.encode(), "status");
    }

    #[test]
    fn test_status_on_empty_registry() {
        let registry = SessionRegistry::new();
        assert_eq!(respond(&Request::Status, &registry), "OK: 0 sessions tracked");
    }

    #[test]
    fn test_list_single_session() {
        let registry = registry_with_main();
        assert_eq!(respond(&Request::List, &registry), "main (/home/u)\n");
    }

    #[test]
    fn test_list_empty_registry() {
        assert_eq!(respond(&Request::List, &SessionRegistry::new()), "");
    }

    #[test]
    fn test_context_dump() {
        let registry = registry_with_main();
        let stamp = registry.find("main").unwrap().last_activity().timestamp();
        let response = respond(&Request::Context("main".to_string()), &registry);
        assert_eq!(
            response,
            format!(
                "Session: main\nCWD: /home/u\nPane: %2\nLast Activity: {stamp}\n\
                 Scrollback Length: 8\nScrollback:\n$ ls\nsrc\n"
            )
        );
    }

    #[test]
    fn test_context_unknown_session() {
        let registry = registry_with_main();
        assert_eq!(
            respond(&Request::Context("ghost".to_string()), &registry),
            "ERROR: Session not found"
        );
    }

    #[test]
    fn test_unknown_command() {
        let registry = registry_with_main();
        assert_eq!(
            respond(&Request::parse("bogus"), &registry),
            "ERROR: Unknown command"
        );
    }

    #[test]
    fn test_dropped_session_not_listed() {
        let mut registry = SessionRegistry::with_capacity(1);
        registry.create_if_absent("main");
        registry.create_if_absent("extra");
        assert_eq!(respond(&Request::List, &registry), "main ()\n");
    }
}
