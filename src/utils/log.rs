use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Level;

/// Target used for experiment data lines (block order, trial records).
pub const DATA_TARGET: &str = "data";

/// Routes tracing output to a session log file.
///
/// The terminal belongs to the frontend while the task runs, so nothing is
/// written to stdout or stderr.
///
/// # Arguments
///
/// * `log_dir` - Directory for the log file (created if missing)
/// * `session_id` - Stem of the log file name
/// * `verbose` - Include debug events
///
/// # Returns
///
/// * `io::Result<PathBuf>` - Path of the log file
pub fn init_session_log(log_dir: &Path, session_id: &str, verbose: bool) -> io::Result<PathBuf> {
    fs::create_dir_all(log_dir)?;

    let path = log_dir.join(format!("{}.log", session_id));
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_max_level(level)
        .with_ansi(false)
        .with_target(true)
        .finish();

    // A subscriber may already be installed (tests, repeated runs in one process).
    let _ = tracing::subscriber::set_global_default(subscriber);

    Ok(path)
}

/// Console logging for the offline tools.
pub fn init_console_log(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_log_file_in_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let path = init_session_log(&log_dir, "p01_test", false).unwrap();
        assert!(path.exists());
        assert_eq!(path.file_name().unwrap(), "p01_test.log");
    }
}
