//! Tracing setup
//!
//! The TUI owns the terminal, so interactive sessions log to a file. Headless
//! commands log to stderr.

use crate::config::Config;
use anyhow::Result;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Where log lines go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
    /// No writable location is known
    Disabled,
}

impl LogTarget {
    /// Pick the target for an interactive session
    pub fn for_tui(log_file: Option<PathBuf>) -> Self {
        match log_file.or_else(default_log_file) {
            Some(path) => LogTarget::File(path),
            None => LogTarget::Disabled,
        }
    }
}

pub fn default_log_file() -> Option<PathBuf> {
    Config::config_dir().map(|dir| dir.join("package-xml-tui.log"))
}

/// `-v` forces debug; otherwise `RUST_LOG`, defaulting to info
fn env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber
pub fn init(target: &LogTarget, verbose: bool) -> Result<()> {
    match target {
        LogTarget::Disabled => Ok(()),
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(env_filter(verbose))
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to initialise logging: {}", e)),
        LogTarget::File(path) => {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter(verbose))
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to initialise logging: {}", e))
        }
    }
}
