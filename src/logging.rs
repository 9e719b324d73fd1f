//! Debug logging to a file
//!
//! The terminal belongs to the visualizer, so logs never go to stdout or
//! stderr. With `--debug` a `tracing` subscriber writes to a private log file;
//! otherwise no subscriber is installed and the macros are no-ops.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Debug log file path (in /tmp for easy access)
pub const DEBUG_LOG_PATH: &str = "/tmp/audiobloom.log";
/// Debug log file permissions (owner read/write only)
#[cfg(unix)]
const DEBUG_LOG_MODE: u32 = 0o600;

/// Open the log file: exclusive create first, then truncate an existing one
fn open_log_file(path: &Path) -> io::Result<File> {
    let mut create = OpenOptions::new();
    create.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        create.mode(DEBUG_LOG_MODE);
    }

    create
        .open(path)
        .or_else(|_| OpenOptions::new().write(true).truncate(true).open(path))
}

/// Install the file subscriber when `debug` is set. `RUST_LOG` overrides
/// the default `debug` filter.
pub fn init(debug: bool) -> io::Result<()> {
    if !debug {
        return Ok(());
    }

    let file = open_log_file(Path::new(DEBUG_LOG_PATH))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    tracing::info!("logging to {}", DEBUG_LOG_PATH);
    Ok(())
}
