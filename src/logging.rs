//! Tracing setup
//!
//! The TUI owns the terminal, so it logs to `<data dir>/cinetui/cinetui.log`.
//! CLI subcommands log to stderr. `RUST_LOG` overrides the default filter.

use anyhow::Result;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "cinetui=info";

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    File,
    Stderr,
}

/// `<data dir>/cinetui/cinetui.log`
pub fn log_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("cinetui").join("cinetui.log"))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber; a second call is a no-op
pub fn init(target: LogTarget) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter());

    match (target, log_path()) {
        (LogTarget::File, Some(path)) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            let _ = builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        // TUI without a data dir: stay silent rather than draw over the screen
        (LogTarget::File, None) => {}
        (LogTarget::Stderr, _) => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
    Ok(())
}
