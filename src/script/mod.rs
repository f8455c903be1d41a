//! Shell script buffer and the tmux command lines that go into it.

mod emit;

pub use emit::{Emitter, LinkedWindows};

use crate::tmux::DEFAULT_SOCKET;

pub const SHEBANG: &str = "#!/usr/bin/env bash";

/// An in-memory bash script that replays tmux commands
#[derive(Debug, Clone)]
pub struct Script {
    lines: Vec<String>,
    /// Socket the script last bootstrapped a server for
    socket: Option<String>,
}

impl Script {
    pub fn new() -> Self {
        Self {
            lines: vec![SHEBANG.to_string()],
            socket: None,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    #[cfg(test)]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines starting with the given tmux subcommand
    #[cfg(test)]
    pub fn count(&self, subcommand: &str) -> usize {
        let prefix = format!("tmux {subcommand}");
        self.lines.iter().filter(|l| l.starts_with(&prefix)).count()
    }

    pub fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    /// Start the server for `socket`, once per run of consecutive sessions on it.
    ///
    /// A non-default socket is selected by aliasing `tmux`, so every later
    /// command in the script talks to that server.
    pub fn bootstrap(&mut self, socket: &str) {
        if self.socket.as_deref() == Some(socket) {
            return;
        }

        if socket != DEFAULT_SOCKET {
            self.push("shopt -s expand_aliases");
            self.push(format!("alias tmux=\"tmux -L {socket}\""));
        } else if self.socket.is_some() {
            self.push("unalias tmux");
        }
        self.push("tmux start-server");
        self.socket = Some(socket.to_string());
    }

    pub fn new_session(&mut self, session: &str, window: &str, path: &str) {
        let session = word(session);
        self.push(format!(
            "tmux has-session -t {session} || tmux new-session -d -P -F 'new session #{{session_name}}'{} -n {} -s {session}",
            path_arg(path),
            word(window),
        ));
    }

    /// Create the group's representative session unless it already exists
    pub fn ensure_group(&mut self, group: &str) {
        let group = word(group);
        self.push(format!(
            "tmux has-session -t {group} || tmux new-session -d -s {group}"
        ));
    }

    pub fn join_group(&mut self, session: &str, group: &str) {
        self.push(format!(
            "tmux new-session -d -P -F 'new session #{{session_name}} group #{{session_group}}' -s {} -t {}",
            word(session),
            word(group),
        ));
    }

    pub fn new_window(&mut self, name: &str, path: &str, location: &str) {
        self.push(format!(
            "tmux new-window -d -k -P -F 'new window #S:#W at #{{window_index}}'{} -n {} -t {}",
            path_arg(path),
            word(name),
            word(location),
        ));
    }

    /// Link `source` into `destination`, replacing whatever window is there
    pub fn link_window(&mut self, source: &str, destination: &str) {
        self.push(format!(
            "tmux link-window -k -s {} -t {}",
            word(source),
            word(destination)
        ));
    }

    pub fn kill_window(&mut self, location: &str) {
        self.push(format!("tmux kill-window -t {}", word(location)));
    }

    /// Split the pane before `index` to create pane `index`
    pub fn split_window(&mut self, location: &str, index: u32, path: &str) {
        let target = format!("{location}.{}", index.saturating_sub(1));
        self.push(format!(
            "tmux split-window -P -F 'split window #S:#{{window_index}}' -t {}{}",
            word(&target),
            path_arg(path),
        ));
    }

    pub fn select_pane(&mut self, location: &str, index: u32) {
        self.push(format!("tmux select-pane -t {}", word(&format!("{location}.{index}"))));
    }

    pub fn select_layout(&mut self, location: &str, layout: &str) {
        self.push(format!(
            "tmux select-layout -t {} {}",
            word(location),
            quote(layout)
        ));
    }

    pub fn select_window(&mut self, location: &str) {
        self.push(format!("tmux select-window -t {}", word(location)));
    }

    /// Attach when run outside tmux, otherwise switch the current client
    pub fn attach_or_switch(&mut self, session: &str) {
        let session = word(session);
        self.push("if [ -z \"$TMUX\" ]; then");
        self.push(format!("  tmux attach-session -t {session}"));
        self.push("else");
        self.push(format!("  tmux switch-client -t {session}"));
        self.push("fi");
    }

    /// Re-attach `session` inside a detached wrapper multiplexer.
    ///
    /// `wrapper` is a command prefix where `{session}` is replaced by the
    /// session name. The wrapped client does not see shell aliases, so the
    /// socket is passed explicitly, and `TMUX` is unset so tmux does not
    /// refuse to nest when the script itself runs inside tmux.
    pub fn reattach(&mut self, wrapper: &str, socket: &str, session: &str) {
        let session = word(session);
        let socket_arg = if socket == DEFAULT_SOCKET {
            String::new()
        } else {
            format!(" -L {socket}")
        };
        self.push(format!(
            "{} env -u TMUX tmux{socket_arg} attach-session -t {session}",
            wrapper.replace("{session}", &session)
        ));
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::new()
    }
}

/// ` -c 'PATH'`, or nothing for an empty path
fn path_arg(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" -c {}", quote(path))
    }
}

/// Single-quote a string for bash
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Leave plain identifiers bare, quote anything the shell would interpret
pub fn word(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_alphanumeric() || "-_.:@%/+=,".contains(c));
    if plain {
        value.to_string()
    } else {
        quote(value)
    }
}
