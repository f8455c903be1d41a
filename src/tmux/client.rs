use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SnapError};

use super::records::{PANE_FORMAT, PANE_TTY_FORMAT, SESSION_FORMAT, WINDOW_FORMAT};
use super::DEFAULT_SOCKET;

/// Raw introspection queries against one tmux server.
///
/// Each method returns the command's stdout untouched; parsing lives in
/// `records` so fakes only have to produce text.
#[async_trait]
pub trait TmuxQuery: Send + Sync {
    /// Name of the socket this query talks to
    fn socket(&self) -> &str;

    /// Check if the tmux server is running
    async fn is_server_running(&self) -> bool;

    async fn list_sessions(&self) -> Result<String>;

    async fn list_windows(&self, session: &str) -> Result<String>;

    /// Panes of one window, `target` is `session:index`
    async fn list_panes(&self, target: &str) -> Result<String>;

    /// Every pane on the server along with its tty
    async fn list_pane_ttys(&self) -> Result<String>;

    /// Value of a global option (`show -gv`)
    async fn show_global(&self, option: &str) -> Result<String>;

    /// Configured pane base index, 0 when it cannot be read
    async fn pane_base_index(&self) -> u32 {
        self.global_index("pane-base-index").await
    }

    /// Index `new-session` gives its first window, 0 when it cannot be read
    async fn window_base_index(&self) -> u32 {
        self.global_index("base-index").await
    }

    /// Numeric global option, 0 when missing or unparsable
    async fn global_index(&self, option: &str) -> u32 {
        match self.show_global(option).await {
            Ok(value) => value.trim().parse().unwrap_or_else(|_| {
                debug!(option, value = %value.trim(), "unparsable index option, using 0");
                0
            }),
            Err(e) => {
                debug!(option, error = %e, "index option unavailable, using 0");
                0
            }
        }
    }
}

/// Client for interacting with tmux via CLI
pub struct TmuxClient {
    /// Path to tmux binary
    tmux_path: String,
    /// Socket name passed as `-L`, `None` for the default server
    socket: Option<String>,
}

impl TmuxClient {
    pub fn new(tmux_path: impl Into<String>) -> Self {
        Self {
            tmux_path: tmux_path.into(),
            socket: None,
        }
    }

    /// Talk to the server listening on the named socket
    pub fn with_socket(mut self, socket: impl Into<String>) -> Self {
        let socket = socket.into();
        self.socket = (socket != DEFAULT_SOCKET).then_some(socket);
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.tmux_path);
        if let Some(socket) = &self.socket {
            cmd.args(["-L", socket]);
        }
        cmd
    }

    fn describe(&self, args: &[&str]) -> String {
        format!("{} {}", self.tmux_path, args.join(" "))
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        let output = self
            .command()
            .args(args)
            .output()
            .await
            .map_err(|source| SnapError::Spawn {
                command: self.describe(args),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SnapError::Command {
                command: self.describe(args),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl TmuxQuery for TmuxClient {
    fn socket(&self) -> &str {
        self.socket.as_deref().unwrap_or(DEFAULT_SOCKET)
    }

    async fn is_server_running(&self) -> bool {
        self.command()
            .arg("list-sessions")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    async fn list_sessions(&self) -> Result<String> {
        self.run(&["list-sessions", "-F", SESSION_FORMAT]).await
    }

    async fn list_windows(&self, session: &str) -> Result<String> {
        self.run(&["list-windows", "-t", session, "-F", WINDOW_FORMAT])
            .await
    }

    async fn list_panes(&self, target: &str) -> Result<String> {
        self.run(&["list-panes", "-t", target, "-F", PANE_FORMAT])
            .await
    }

    async fn list_pane_ttys(&self) -> Result<String> {
        self.run(&["list-panes", "-a", "-F", PANE_TTY_FORMAT]).await
    }

    async fn show_global(&self, option: &str) -> Result<String> {
        self.run(&["show", "-gv", option]).await
    }
}

impl Default for TmuxClient {
    fn default() -> Self {
        Self::new("tmux")
    }
}
