use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cli::{Cli, STDOUT_MARKER};
use crate::output::{Layout, OutputTarget};
use crate::tmux::DEFAULT_SOCKET;

pub const DEFAULT_REATTACH_WRAPPER: &str = "screen -dmS {session}";

/// Settings read from `config.toml`, every key optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub tmux_path: Option<String>,
    pub output: Option<String>,
    pub layout: Option<Layout>,
    pub sockets: Option<Vec<String>>,
    pub history_dir: Option<PathBuf>,
    pub link_history: Option<bool>,
    pub reattach: Option<bool>,
    pub reattach_wrapper: Option<String>,
}

/// Fully resolved run configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to tmux binary
    pub tmux_path: String,
    pub target: OutputTarget,
    pub layout: Layout,
    /// Servers to snapshot, by socket name
    pub sockets: Vec<String>,
    pub history_dir: PathBuf,
    pub link_history: bool,
    pub reattach: bool,
    /// Command prefix wrapping each re-attached client, `{session}` is substituted
    pub reattach_wrapper: String,
}

impl FileConfig {
    /// Default location: `<config dir>/tmux-snap/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tmux-snap").join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }
}

impl Config {
    /// Load the config file (explicit path or default location) and apply CLI overrides
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => match FileConfig::default_path() {
                Some(path) if path.exists() => FileConfig::load(&path)?,
                _ => FileConfig::default(),
            },
        };
        Ok(Self::resolve(cli, file))
    }

    pub fn resolve(cli: &Cli, file: FileConfig) -> Self {
        let home = dirs::home_dir().unwrap_or_default();

        let output = cli
            .output
            .clone()
            .or(file.output)
            .unwrap_or_else(|| home.join(".tmux_sessions").to_string_lossy().into_owned());

        let mut layout = cli.layout.or(file.layout).unwrap_or_default();
        let target = if output == STDOUT_MARKER {
            layout = Layout::Stream;
            OutputTarget::Stdout
        } else {
            let path = expand_home(&output, &home);
            match layout {
                Layout::Stream => OutputTarget::File(path),
                Layout::PerSession | Layout::PerSocket => OutputTarget::Directory(path),
            }
        };

        let mut sockets = if cli.sockets.is_empty() {
            file.sockets.unwrap_or_default()
        } else {
            cli.sockets.clone()
        };
        if sockets.is_empty() {
            sockets.push(DEFAULT_SOCKET.to_string());
        }

        Self {
            tmux_path: file.tmux_path.unwrap_or_else(|| "tmux".to_string()),
            target,
            layout,
            sockets,
            history_dir: file
                .history_dir
                .map(|dir| expand_home(&dir.to_string_lossy(), &home))
                .unwrap_or_else(|| home.join(".bash_history.d")),
            link_history: !cli.no_history && file.link_history.unwrap_or(true),
            reattach: cli.reattach || file.reattach.unwrap_or(false),
            reattach_wrapper: file
                .reattach_wrapper
                .unwrap_or_else(|| DEFAULT_REATTACH_WRAPPER.to_string()),
        }
    }
}

fn expand_home(path: &str, home: &Path) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None if path == "~" => home.to_path_buf(),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::resolve(&Cli::default(), FileConfig::default());
        let home = dirs::home_dir().unwrap_or_default();

        assert_eq!(config.layout, Layout::PerSession);
        assert_eq!(
            config.target,
            OutputTarget::Directory(home.join(".tmux_sessions"))
        );
        assert_eq!(config.sockets, [DEFAULT_SOCKET]);
        assert_eq!(config.history_dir, home.join(".bash_history.d"));
        assert!(config.link_history);
        assert!(!config.reattach);
        assert_eq!(config.tmux_path, "tmux");
    }

    #[test]
    fn test_stdout_marker_forces_stream() {
        let cli = Cli {
            output: Some("-".to_string()),
            layout: Some(Layout::PerSession),
            ..Cli::default()
        };
        let config = Config::resolve(&cli, FileConfig::default());
        assert_eq!(config.target, OutputTarget::Stdout);
        assert_eq!(config.layout, Layout::Stream);
    }

    #[test]
    fn test_cli_overrides_file() {
        let file: FileConfig = toml::from_str(
            r#"
            tmux_path = "/opt/bin/tmux"
            output = "/var/tmp/snap.sh"
            layout = "stream"
            sockets = ["work"]
            link_history = false
            reattach_wrapper = "dtach -n /tmp/{session}"
            "#,
        )
        .unwrap();
        let cli = Cli {
            sockets: vec!["play".to_string()],
            reattach: true,
            ..Cli::default()
        };

        let config = Config::resolve(&cli, file);
        assert_eq!(config.tmux_path, "/opt/bin/tmux");
        assert_eq!(
            config.target,
            OutputTarget::File(PathBuf::from("/var/tmp/snap.sh"))
        );
        assert_eq!(config.sockets, ["play"]);
        assert!(!config.link_history);
        assert!(config.reattach);
        assert_eq!(config.reattach_wrapper, "dtach -n /tmp/{session}");
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(toml::from_str::<FileConfig>("colour = true").is_err());
    }

    #[test]
    fn test_expand_home() {
        let home = Path::new("/home/elle");
        assert_eq!(expand_home("~/snaps", home), home.join("snaps"));
        assert_eq!(expand_home("/tmp/x", home), PathBuf::from("/tmp/x"));
    }
}
