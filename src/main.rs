use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::error;

mod cli;
mod config;
mod error;
mod history;
mod output;
mod script;
mod snapshot;
#[cfg(test)]
mod testing;
mod tmux;

use cli::Cli;
use config::Config;
use error::SnapError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr, stdout may carry the script
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli)?;

    match snapshot::run(&config).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(SnapError::ServerNotRunning { socket }) => {
            error!(%socket, "tmux server is not running");
            Ok(ExitCode::from(1))
        }
        Err(e) => {
            if let Some(line) = e.raw_line() {
                println!("line {line}");
            }
            Err(e).context("Failed to snapshot tmux sessions")
        }
    }
}
