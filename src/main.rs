mod app;
mod config;
mod tui;

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Args;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;
    info!(engine = %args.engine.display(), "kibitz starting");

    let result = app::run(&args);
    match &result {
        Ok(()) => info!("kibitz exiting"),
        Err(err) => error!(error = %format!("{err:#}"), "kibitz failed"),
    }
    result
}

/// Send tracing output to `path`; the terminal belongs to the board.
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
