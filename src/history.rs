//! Hard-link per-tty shell history files to names keyed by pane coordinates.
//!
//! Shells started inside tmux are expected to keep their history in
//! `<dir>/<tty name>`. Terminal devices are reused across runs, so each
//! history file also gets a `<session>-<window>-<pane>` link that follows
//! the pane instead of the tty.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, SnapError};
use crate::tmux::{parse_pane_ttys, PaneTty, TmuxQuery};

/// Link the history of every pane on the server, returning how many links were made
pub async fn link_histfiles<Q: TmuxQuery + ?Sized>(tmux: &Q, dir: &Path) -> Result<usize> {
    let panes = parse_pane_ttys(&tmux.list_pane_ttys().await?)?;

    let mut linked = 0;
    for pane in &panes {
        if link_pane(dir, pane).await? {
            linked += 1;
        }
    }

    debug!(socket = tmux.socket(), linked, total = panes.len(), "history files linked");
    Ok(linked)
}

pub fn source_path(dir: &Path, pane: &PaneTty) -> PathBuf {
    dir.join(pane.tty_name())
}

pub fn destination_path(dir: &Path, pane: &PaneTty) -> PathBuf {
    dir.join(format!(
        "{}-{}-{}",
        pane.session, pane.window_index, pane.pane_index
    ))
}

/// Replace the pane's coordinate link with the current tty history.
///
/// Absent or empty history files are skipped and leave any existing link alone.
async fn link_pane(dir: &Path, pane: &PaneTty) -> Result<bool> {
    let src = source_path(dir, pane);
    let dst = destination_path(dir, pane);

    match tokio::fs::metadata(&src).await {
        Ok(meta) if meta.len() > 0 => {}
        _ => return Ok(false),
    }

    if tokio::fs::symlink_metadata(&dst).await.is_ok() {
        tokio::fs::remove_file(&dst)
            .await
            .map_err(|e| SnapError::io(&dst, e))?;
    }

    tokio::fs::hard_link(&src, &dst)
        .await
        .map_err(|e| SnapError::io(&dst, e))?;

    debug!(src = %src.display(), dst = %dst.display(), "linked history");
    Ok(true)
}
