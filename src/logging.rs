//! Diagnostic logging for the binary.
//!
//! Records go to stdout; everything logged through `tracing` goes to stderr
//! (or to the `--debug-log` file) so the two never interleave.

use std::path::Path;
use tracing_subscriber::EnvFilter;

pub fn init(debug_log: Option<&Path>) -> anyhow::Result<()> {
    match debug_log {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_env_filter(env_filter("debug"))
                .try_init()
                .map_err(|e| anyhow::anyhow!(e))?;
            tracing::info!(path = %path.display(), "cwtail debug log started");
        }
        None => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(env_filter("warn"))
                .try_init()
                .map_err(|e| anyhow::anyhow!(e))?;
        }
    }
    Ok(())
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new(default))
}
