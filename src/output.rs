//! Where generated scripts end up.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Deserialize;
use tracing::info;

use crate::error::{Result, SnapError};

/// How sessions are split across scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// One script per session, each ending with attach-or-switch
    #[default]
    PerSession,
    /// One script per tmux server socket
    PerSocket,
    /// A single script covering every server
    Stream,
}

/// Resolved destination for the generated scripts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    /// A single script file
    File(PathBuf),
    /// A directory receiving one script per socket or session
    Directory(PathBuf),
}

/// A finished script and the file name it should be stored under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedScript {
    /// File name inside the output directory, `None` for the stream script
    pub name: Option<String>,
    pub contents: String,
}

impl OutputTarget {
    pub fn write(&self, scripts: &[RenderedScript]) -> Result<()> {
        match self {
            OutputTarget::Stdout => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                for script in scripts {
                    handle
                        .write_all(script.contents.as_bytes())
                        .map_err(|e| SnapError::io("<stdout>", e))?;
                }
                handle.flush().map_err(|e| SnapError::io("<stdout>", e))
            }
            OutputTarget::File(path) => {
                let contents: String = scripts.iter().map(|s| s.contents.as_str()).collect();
                write_private(path, &contents)
            }
            OutputTarget::Directory(dir) => {
                let files = file_names(scripts)?;
                std::fs::create_dir_all(dir).map_err(|e| SnapError::io(dir, e))?;
                for (file, script) in files.iter().zip(scripts) {
                    write_private(&dir.join(file), &script.contents)?;
                }
                Ok(())
            }
        }
    }
}

/// Create or truncate `path`, readable and executable by the owner only
pub fn write_private(path: &Path, contents: &str) -> Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o700);
    }

    let mut file = options.open(path).map_err(|e| SnapError::io(path, e))?;
    file.write_all(contents.as_bytes())
        .map_err(|e| SnapError::io(path, e))?;

    info!(path = %path.display(), "wrote script");
    Ok(())
}

/// Session and socket names may contain `/`, which cannot appear in a file name
fn file_name(name: &str) -> String {
    name.replace('/', "_")
}

/// File name of every script, refusing to let one script overwrite another
fn file_names(scripts: &[RenderedScript]) -> Result<Vec<String>> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    let mut files = Vec::with_capacity(scripts.len());

    for script in scripts {
        let name = script.name.as_deref().unwrap_or("tmux-session");
        let file = file_name(name);
        if let Some(first) = seen.insert(file.clone(), name) {
            return Err(SnapError::NameCollision {
                file,
                first: first.to_string(),
                second: name.to_string(),
            });
        }
        files.push(file);
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(name: Option<&str>, contents: &str) -> RenderedScript {
        RenderedScript {
            name: name.map(str::to_string),
            contents: contents.to_string(),
        }
    }

    #[test]
    fn test_directory_gets_one_file_per_script() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("sessions");
        let target = OutputTarget::Directory(out.clone());

        target
            .write(&[script(Some("work"), "a\n"), script(Some("a/b"), "b\n")])
            .unwrap();

        assert_eq!(std::fs::read_to_string(out.join("work")).unwrap(), "a\n");
        assert_eq!(std::fs::read_to_string(out.join("a_b")).unwrap(), "b\n");
    }

    #[test]
    fn test_colliding_names_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("sessions");
        let target = OutputTarget::Directory(out.clone());

        let err = target
            .write(&[
                script(Some("a/b"), "first\n"),
                script(Some("work"), "w\n"),
                script(Some("a_b"), "second\n"),
            ])
            .unwrap_err();

        match err {
            SnapError::NameCollision { file, first, second } => {
                assert_eq!(file, "a_b");
                assert_eq!(first, "a/b");
                assert_eq!(second, "a_b");
            }
            other => panic!("expected NameCollision, got {:?}", other),
        }
        assert!(!out.exists());
    }

    #[test]
    fn test_file_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restore.sh");
        std::fs::write(&path, "old contents that are longer\n").unwrap();

        OutputTarget::File(path.clone())
            .write(&[script(None, "new\n")])
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_is_private_and_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("work");
        write_private(&path, "#!/usr/bin/env bash\n").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }
}
