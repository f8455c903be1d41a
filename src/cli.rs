use clap::Parser;
use std::path::PathBuf;

use crate::output::Layout;

/// Marker value selecting standard output instead of a file or directory
pub const STDOUT_MARKER: &str = "-";

#[derive(Parser, Debug, Default)]
#[command(name = "tmux-snap")]
#[command(about = "Save running tmux sessions as scripts that recreate them", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Where to write the scripts (`-` for stdout, default ~/.tmux_sessions)
    pub output: Option<String>,

    /// One script per session, one per server socket, or a single script
    #[arg(long, value_enum)]
    pub layout: Option<Layout>,

    /// Socket name of a tmux server to snapshot (repeatable, default server when omitted)
    #[arg(short = 'L', long = "socket")]
    pub sockets: Vec<String>,

    /// Re-attach originally attached sessions in wrapper terminals at the end of the script
    #[arg(long)]
    pub reattach: bool,

    /// Skip hard-linking shell history files
    #[arg(long)]
    pub no_history: bool,

    /// Read configuration from this file instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,
}
