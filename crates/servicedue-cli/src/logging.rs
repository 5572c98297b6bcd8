//! Tracing setup for the binary.
//!
//! Ordinary subcommands log to stderr. The dashboard owns the terminal, so
//! its logs go to a file in the local data directory instead.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

const APP_DIR: &str = "servicedue";
const LOG_FILE: &str = "servicedue.log";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Log to stderr; `RUST_LOG` overrides the default `warn` level.
pub fn init_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("warn"))
        .with_writer(std::io::stderr)
        .init();
}

/// Log to `<data dir>/servicedue/servicedue.log` at `info` by default.
///
/// Returns the path of the log file.
pub fn init_file() -> Result<PathBuf> {
    let dir = dirs::data_local_dir()
        .context("could not determine local data directory")?
        .join(APP_DIR);
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter("info"))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(path)
}
