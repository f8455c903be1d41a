use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while snapshotting a tmux server
#[derive(Debug, Error)]
pub enum SnapError {
    /// `tmux list-sessions` failed, so there is nothing to snapshot
    #[error("no tmux server running on socket '{socket}'")]
    ServerNotRunning { socket: String },

    /// A record returned by tmux did not have the expected shape
    #[error("malformed {kind} record: {reason}")]
    MalformedRecord {
        kind: &'static str,
        line: String,
        reason: String,
    },

    /// The tmux binary could not be started
    #[error("failed to execute `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The tmux binary exited with a failure status
    #[error("`{command}` failed: {stderr}")]
    Command { command: String, stderr: String },

    /// Two scripts would be written to the same file
    #[error("scripts '{first}' and '{second}' both map to file '{file}'")]
    NameCollision {
        file: String,
        first: String,
        second: String,
    },

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SnapError {
    pub fn malformed(kind: &'static str, line: &str, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            kind,
            line: line.to_string(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The raw offending line, when the error came from parsing tmux output
    pub fn raw_line(&self) -> Option<&str> {
        match self {
            Self::MalformedRecord { line, .. } => Some(line),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SnapError>;
