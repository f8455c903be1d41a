use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::Result;
use crate::tmux::{parse_panes, parse_windows, SessionRecord, TmuxQuery};

use super::Script;

/// First location (`session:index`) at which each linked window was created
#[derive(Debug, Default)]
pub struct LinkedWindows {
    primary: HashMap<String, String>,
}

impl LinkedWindows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primary(&self, window_id: &str) -> Option<&str> {
        self.primary.get(window_id).map(String::as_str)
    }

    fn record(&mut self, window_id: &str, location: &str) {
        self.primary
            .entry(window_id.to_string())
            .or_insert_with(|| location.to_string());
    }
}

/// Translates the live state of one tmux server into script commands.
///
/// Owns the set of session groups whose windows were already emitted, so a
/// group is expanded once no matter how many scripts the server is split
/// into.
pub struct Emitter<'a, Q: TmuxQuery + ?Sized> {
    tmux: &'a Q,
    pane_base_index: u32,
    window_base_index: u32,
    groups: HashSet<String>,
    self_contained: bool,
}

impl<'a, Q: TmuxQuery + ?Sized> Emitter<'a, Q> {
    /// Create an emitter, reading the pane base index from the live server
    pub async fn new(tmux: &'a Q) -> Self {
        let pane_base_index = tmux.pane_base_index().await;
        let window_base_index = tmux.window_base_index().await;
        debug!(
            socket = tmux.socket(),
            pane_base_index,
            window_base_index,
            "emitter ready"
        );
        Self {
            tmux,
            pane_base_index,
            window_base_index,
            groups: HashSet::new(),
            self_contained: false,
        }
    }

    /// Every session gets its own script, so a group member must be able to
    /// create the group's session even when another script expanded it
    pub fn self_contained(mut self, enabled: bool) -> Self {
        self.self_contained = enabled;
        self
    }

    #[cfg(test)]
    pub fn pane_base_index(&self) -> u32 {
        self.pane_base_index
    }

    /// Emit the commands recreating one session and, when needed, its windows
    pub async fn session(
        &mut self,
        session: &SessionRecord,
        script: &mut Script,
        linked: &mut LinkedWindows,
    ) -> Result<()> {
        script.bootstrap(session.socket());

        if !session.grouped {
            debug!(session = %session.name, "standalone session");
            script.new_session(&session.name, &session.window, &session.path);
            return self
                .windows(&session.name, &session.name, script, linked)
                .await;
        }

        let group = session.group.as_str();
        if !self.groups.contains(group) {
            debug!(session = %session.name, group, "materializing session group");
            script.ensure_group(group);
            self.windows(&session.name, group, script, linked).await?;
            self.groups.insert(group.to_string());
        } else if self.self_contained {
            script.ensure_group(group);
        }

        // The group's representative session already exists by now
        if session.name != group {
            script.join_group(&session.name, group);
        }
        Ok(())
    }

    /// Emit the windows of the live `session` into the script's `target` session
    async fn windows(
        &self,
        session: &str,
        target: &str,
        script: &mut Script,
        linked: &mut LinkedWindows,
    ) -> Result<()> {
        let windows = parse_windows(&self.tmux.list_windows(session).await?)?;

        for window in &windows {
            let location = format!("{target}:{}", window.index);

            if window.linked {
                if let Some(primary) = linked.primary(&window.id) {
                    debug!(window = %window.id, %location, primary, "linking window");
                    script.link_window(primary, &location);
                    continue;
                }
                linked.record(&window.id, &location);
            }

            script.new_window(&window.name, &window.path, &location);
            self.panes(&format!("{session}:{}", window.index), &location, script)
                .await?;
            script.select_layout(&location, &window.layout);
            if window.active {
                script.select_window(&location);
            }
        }

        // new-session leaves a window at the base index that nothing replaced
        let base_taken = windows.iter().any(|w| w.index == self.window_base_index);
        if !windows.is_empty() && !base_taken {
            script.kill_window(&format!("{target}:{}", self.window_base_index));
        }

        Ok(())
    }

    /// Emit the panes of the live window `source` into the script's `location`.
    ///
    /// The base pane comes with the window, every other pane is split off
    /// its predecessor.
    async fn panes(&self, source: &str, location: &str, script: &mut Script) -> Result<()> {
        let panes = parse_panes(&self.tmux.list_panes(source).await?)?;

        for pane in &panes {
            if pane.index != self.pane_base_index {
                script.split_window(location, pane.index, &pane.path);
            }
            if pane.active {
                script.select_pane(location, pane.index);
            }
        }

        Ok(())
    }
}
