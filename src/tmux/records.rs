//! Format strings handed to tmux and parsers for the records they produce.
//!
//! Every record is a single line of space-separated fields. Fields that may
//! legitimately be empty (paths, group names) carry a `key=` prefix so the
//! field count stays fixed.

use crate::error::{Result, SnapError};

use super::{PaneRecord, PaneTty, SessionRecord, WindowRecord};

pub const SESSION_FORMAT: &str = "#S #{session_attached} #{socket_path} #W p=#{pane_current_path} #{session_grouped} g=#{session_group}";

pub const WINDOW_FORMAT: &str = "#{window_id} #W #{window_index} #{window_active} #{window_linked} #{window_layout} p=#{pane_current_path} #{window_panes}";

pub const PANE_FORMAT: &str = "#P #{pane_active} p=#{pane_current_path}";

pub const PANE_TTY_FORMAT: &str = "#{session_name} #{window_index} #{pane_index} #{pane_tty}";

pub fn parse_sessions(output: &str) -> Result<Vec<SessionRecord>> {
    records(output).map(parse_session_line).collect()
}

pub fn parse_windows(output: &str) -> Result<Vec<WindowRecord>> {
    records(output).map(parse_window_line).collect()
}

pub fn parse_panes(output: &str) -> Result<Vec<PaneRecord>> {
    records(output).map(parse_pane_line).collect()
}

pub fn parse_pane_ttys(output: &str) -> Result<Vec<PaneTty>> {
    records(output).map(parse_pane_tty_line).collect()
}

fn records(output: &str) -> impl Iterator<Item = &str> {
    output.lines().filter(|line| !line.trim().is_empty())
}

fn parse_session_line(line: &str) -> Result<SessionRecord> {
    let [name, attached, socket_path, window, path, grouped, group] =
        fields::<7>("session", line)?;

    Ok(SessionRecord {
        name: name.to_string(),
        attached: number("session", line, attached)?,
        socket_path: socket_path.to_string(),
        window: window.to_string(),
        path: after_eq(path).to_string(),
        grouped: flag("session", line, grouped)?,
        group: after_eq(group).to_string(),
    })
}

fn parse_window_line(line: &str) -> Result<WindowRecord> {
    let [id, name, index, active, linked, layout, path, pane_count] =
        fields::<8>("window", line)?;

    Ok(WindowRecord {
        id: id.to_string(),
        name: name.to_string(),
        index: number("window", line, index)?,
        active: flag("window", line, active)?,
        linked: flag("window", line, linked)?,
        layout: layout.to_string(),
        path: after_eq(path).to_string(),
        pane_count: number("window", line, pane_count)?,
    })
}

fn parse_pane_line(line: &str) -> Result<PaneRecord> {
    let [index, active, path] = fields::<3>("pane", line)?;

    Ok(PaneRecord {
        index: number("pane", line, index)?,
        active: flag("pane", line, active)?,
        path: after_eq(path).to_string(),
    })
}

fn parse_pane_tty_line(line: &str) -> Result<PaneTty> {
    let [session, window_index, pane_index, tty] = fields::<4>("pane tty", line)?;

    Ok(PaneTty {
        session: session.to_string(),
        window_index: number("pane tty", line, window_index)?,
        pane_index: number("pane tty", line, pane_index)?,
        tty: tty.to_string(),
    })
}

/// Split a record into exactly `N` whitespace-separated fields
fn fields<'a, const N: usize>(kind: &'static str, line: &'a str) -> Result<[&'a str; N]> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let count = parts.len();
    parts.try_into().map_err(|_| {
        SnapError::malformed(kind, line, format!("expected {N} fields, got {count}"))
    })
}

fn number(kind: &'static str, line: &str, value: &str) -> Result<u32> {
    value
        .parse()
        .map_err(|_| SnapError::malformed(kind, line, format!("'{value}' is not a number")))
}

fn flag(kind: &'static str, line: &str, value: &str) -> Result<bool> {
    number(kind, line, value).map(|n| n != 0)
}

/// Value of a `key=value` field; the whole field when there is no `=`
fn after_eq(field: &str) -> &str {
    field.split_once('=').map_or(field, |(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session() {
        let output = "work 1 /tmp/tmux-1000/default vim p=/home/elle/src 0 g=\n";
        let sessions = parse_sessions(output).unwrap();
        assert_eq!(sessions.len(), 1);

        let session = &sessions[0];
        assert_eq!(session.name, "work");
        assert_eq!(session.attached, 1);
        assert_eq!(session.socket(), "default");
        assert_eq!(session.window, "vim");
        assert_eq!(session.path, "/home/elle/src");
        assert!(!session.grouped);
        assert_eq!(session.group, "");
    }

    #[test]
    fn test_parse_grouped_session() {
        let output = "mirror 0 /tmp/tmux-1000/other zsh p= 1 g=work";
        let session = &parse_sessions(output).unwrap()[0];
        assert_eq!(session.socket(), "other");
        assert_eq!(session.path, "");
        assert!(session.grouped);
        assert_eq!(session.group, "work");
    }

    #[test]
    fn test_parse_window() {
        let output = "@4 editor 2 1 0 b25d,204x51,0,0{102x51,0,0,3,101x51,103,0,4} p=/srv 2";
        let window = &parse_windows(output).unwrap()[0];
        assert_eq!(window.id, "@4");
        assert_eq!(window.name, "editor");
        assert_eq!(window.index, 2);
        assert!(window.active);
        assert!(!window.linked);
        assert_eq!(window.layout, "b25d,204x51,0,0{102x51,0,0,3,101x51,103,0,4}");
        assert_eq!(window.path, "/srv");
        assert_eq!(window.pane_count, 2);
    }

    #[test]
    fn test_parse_panes_skips_blank_lines() {
        let output = "0 0 p=/a\n\n1 1 p=/b\n";
        let panes = parse_panes(output).unwrap();
        assert_eq!(panes.len(), 2);
        assert_eq!(panes[1].index, 1);
        assert!(panes[1].active);
        assert_eq!(panes[1].path, "/b");
    }

    #[test]
    fn test_path_keeps_later_equals_signs() {
        let panes = parse_panes("0 1 p=/tmp/a=b").unwrap();
        assert_eq!(panes[0].path, "/tmp/a=b");
    }

    #[test]
    fn test_wrong_field_count_keeps_raw_line() {
        let err = parse_windows("@1 my window 0 1 0 layout p=/ 1").unwrap_err();
        assert_eq!(err.raw_line(), Some("@1 my window 0 1 0 layout p=/ 1"));
        assert!(err.to_string().contains("expected 8 fields, got 9"));
    }

    #[test]
    fn test_non_numeric_index_is_malformed() {
        let err = parse_panes("x 1 p=/").unwrap_err();
        assert!(matches!(err, SnapError::MalformedRecord { kind: "pane", .. }));
    }

    #[test]
    fn test_parse_pane_ttys() {
        let ttys = parse_pane_ttys("work 1 0 /dev/pts/3\nwork 1 1 /dev/pts/4").unwrap();
        assert_eq!(ttys.len(), 2);
        assert_eq!(ttys[1].window_index, 1);
        assert_eq!(ttys[1].pane_index, 1);
        assert_eq!(ttys[1].tty_name(), "4");
    }
}
