//! File logging
//!
//! The TUI owns the terminal, so log output goes to
//! `<config dir>/subdx/subdx.log`, truncated on every start.

use chrono::Local;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::config_dir;

static LOG_FILE: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Install the tracing subscriber and return the log path.
///
/// `RUST_LOG` wins over `verbose`. Returns `None` when no log file could be
/// created; logging is then disabled.
pub fn init_log(verbose: bool) -> Option<PathBuf> {
    let dir = config_dir()?;
    fs::create_dir_all(&dir).ok()?;
    let log_path = dir.join("subdx.log");

    let mut file = File::create(&log_path).ok()?;
    let _ = writeln!(
        file,
        "=== subdx log started {} ===",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let level = if verbose { "subdx=debug" } else { "subdx=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .ok()?;

    if let Ok(mut guard) = LOG_FILE.lock() {
        *guard = Some(log_path.clone());
    }

    Some(log_path)
}

/// Path of the active log file
pub fn log_path() -> Option<PathBuf> {
    LOG_FILE.lock().ok().and_then(|g| g.clone())
}

/// Last `n` lines of the log, oldest first
pub fn read_recent_logs(n: usize) -> Vec<String> {
    let Some(path) = log_path() else {
        return vec!["Log not initialized".to_string()];
    };

    match fs::read_to_string(&path) {
        Ok(content) => {
            let lines: Vec<&str> = content.lines().collect();
            let start = lines.len().saturating_sub(n);
            lines[start..].iter().map(|l| l.to_string()).collect()
        }
        Err(_) => vec!["Could not read log file".to_string()],
    }
}
