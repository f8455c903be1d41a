//! In-memory tmux server used by the unit tests.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::{Result, SnapError};
use crate::tmux::{TmuxQuery, DEFAULT_SOCKET};

/// Canned `tmux` output keyed by query target
pub struct FakeTmux {
    socket: String,
    running: bool,
    sessions: Vec<String>,
    windows: HashMap<String, String>,
    panes: HashMap<String, String>,
    pane_ttys: Vec<String>,
    pane_base_index: Option<String>,
    base_index: Option<String>,
}

impl FakeTmux {
    pub fn new() -> Self {
        Self {
            socket: DEFAULT_SOCKET.to_string(),
            running: true,
            sessions: Vec::new(),
            windows: HashMap::new(),
            panes: HashMap::new(),
            pane_ttys: Vec::new(),
            pane_base_index: None,
            base_index: None,
        }
    }

    pub fn with_socket(mut self, socket: &str) -> Self {
        self.socket = socket.to_string();
        self
    }

    pub fn stopped(mut self) -> Self {
        self.running = false;
        self
    }

    pub fn session(mut self, line: &str) -> Self {
        self.sessions.push(line.to_string());
        self
    }

    pub fn windows(mut self, session: &str, output: &str) -> Self {
        self.windows.insert(session.to_string(), output.to_string());
        self
    }

    pub fn panes(mut self, target: &str, output: &str) -> Self {
        self.panes.insert(target.to_string(), output.to_string());
        self
    }

    pub fn pane_tty(mut self, line: &str) -> Self {
        self.pane_ttys.push(line.to_string());
        self
    }

    pub fn with_pane_base_index(mut self, value: &str) -> Self {
        self.pane_base_index = Some(value.to_string());
        self
    }

    pub fn with_base_index(mut self, value: &str) -> Self {
        self.base_index = Some(value.to_string());
        self
    }

    fn missing(what: &str) -> SnapError {
        SnapError::Command {
            command: format!("tmux {what}"),
            stderr: "can't find target".to_string(),
        }
    }
}

#[async_trait]
impl TmuxQuery for FakeTmux {
    fn socket(&self) -> &str {
        &self.socket
    }

    async fn is_server_running(&self) -> bool {
        self.running
    }

    async fn list_sessions(&self) -> Result<String> {
        Ok(self.sessions.join("\n"))
    }

    async fn list_windows(&self, session: &str) -> Result<String> {
        self.windows
            .get(session)
            .cloned()
            .ok_or_else(|| Self::missing(&format!("list-windows -t {session}")))
    }

    async fn list_panes(&self, target: &str) -> Result<String> {
        self.panes
            .get(target)
            .cloned()
            .ok_or_else(|| Self::missing(&format!("list-panes -t {target}")))
    }

    async fn list_pane_ttys(&self) -> Result<String> {
        Ok(self.pane_ttys.join("\n"))
    }

    async fn show_global(&self, option: &str) -> Result<String> {
        let value = match option {
            "pane-base-index" => self.pane_base_index.as_ref(),
            "base-index" => self.base_index.as_ref(),
            _ => None,
        };
        match value {
            Some(value) => Ok(format!("{value}\n")),
            None => Err(Self::missing(&format!("show -gv {option}"))),
        }
    }
}
