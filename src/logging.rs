//! Log setup
//!
//! The terminal belongs to the TUI, so logs go to a file. `RUST_LOG` selects
//! levels; without it only this crate logs, at `info`.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "dexdash=info";
const LOG_FILE_NAME: &str = "dexdash.log";

/// Where log output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Append to a file
    File(PathBuf),
    /// Write to stderr (used by `--once`, which has no TUI)
    Stderr,
}

/// Default log file: `<cache dir>/dexdash.log`, or the temp dir if the
/// platform has no cache directory for us
pub fn default_log_path() -> PathBuf {
    ProjectDirs::from("", "", "dexdash")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(std::env::temp_dir)
        .join(LOG_FILE_NAME)
}

/// Builds the level filter from `RUST_LOG`, falling back to the default
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Opens `path` for appending, creating parent directories as needed
fn open_log_file(path: &Path) -> io::Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Installs the global subscriber
///
/// Calling this twice is harmless: the second subscriber is dropped.
pub fn init(target: &LogTarget) -> io::Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter());
    // An already-installed subscriber is fine
    let _ = match target {
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        LogTarget::Stderr => builder.with_writer(io::stderr).try_init(),
    };
    Ok(())
}
