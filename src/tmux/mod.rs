mod client;
mod records;

pub use client::{TmuxClient, TmuxQuery};
pub use records::{parse_pane_ttys, parse_panes, parse_sessions, parse_windows};

/// Name tmux gives its socket when no `-L` is passed
pub const DEFAULT_SOCKET: &str = "default";

/// A tmux session as reported by `list-sessions`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// Session name (unique per server)
    pub name: String,
    /// Number of attached clients
    pub attached: u32,
    /// Full path of the server socket
    pub socket_path: String,
    /// Name of the session's current window
    pub window: String,
    /// Working directory of the current pane
    pub path: String,
    /// Whether the session belongs to a group
    pub grouped: bool,
    /// Group name, empty for standalone sessions
    pub group: String,
}

impl SessionRecord {
    /// Socket name, i.e. the last segment of the socket path
    pub fn socket(&self) -> &str {
        basename(&self.socket_path)
    }

    pub fn is_attached(&self) -> bool {
        self.attached > 0
    }
}

/// A window as reported by `list-windows`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRecord {
    /// Window id (e.g. "@3"), shared by every link of the same window
    pub id: String,
    pub name: String,
    pub index: u32,
    pub active: bool,
    pub linked: bool,
    /// Layout descriptor, replayed verbatim by `select-layout`
    pub layout: String,
    pub path: String,
    pub pane_count: u32,
}

/// A pane as reported by `list-panes -t session:window`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneRecord {
    pub index: u32,
    pub active: bool,
    pub path: String,
}

/// A pane and its controlling terminal, from `list-panes -a`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneTty {
    pub session: String,
    pub window_index: u32,
    pub pane_index: u32,
    pub tty: String,
}

impl PaneTty {
    /// Terminal device name without its directory (e.g. "pts/4" -> "4")
    pub fn tty_name(&self) -> &str {
        basename(&self.tty)
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
