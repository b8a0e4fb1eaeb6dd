//! canvasly: edit Business Model Canvas and First Principle Reasoning
//! documents from the terminal.
//!
//! Documents are kept in one JSON file using the same keys and format as the
//! browser build's `localStorage`.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use canvasly_cli::{Args, Flow, JsonFileStore, Shell};
use canvasly_core::Workbench;

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays usable for `export` and `print`
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.default_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = args.into_config()?;
    info!("Store path: {:?}", config.store_path);

    let store = JsonFileStore::open(&config.store_path)
        .with_context(|| format!("Failed to open store {}", config.store_path.display()))?;
    let workbench = Workbench::open(store, config.template);
    let mut shell = Shell::new(workbench);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    shell.greet(&mut out)?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        match shell.run_line(&line, &mut out) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => {
                debug!("Command failed: {:?}", e);
                writeln!(out, "error: {:#}", e)?;
            }
        }
        out.flush()?;
    }

    info!("Shutting down");
    Ok(())
}
