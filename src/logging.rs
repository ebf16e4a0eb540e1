// 📝 Logging
//
// Two channels:
// - ProgressLog: append-only run journal, one `<timestamp>:<message>` line
//   per pipeline milestone, timestamps like `2023-Sep-08-09:16:35`
// - tracing: diagnostics on stderr, filtered by RUST_LOG (default `info`)

use crate::error::{EtlError, EtlResult};
use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub const TIMESTAMP_FORMAT: &str = "%Y-%b-%d-%H:%M:%S";

// Milestone messages, in run order
pub const MSG_PRELIMINARIES: &str = "Preliminaries complete. Initiating ETL process.";
pub const MSG_EXTRACTED: &str = "Data extraction complete. Initiating Transformation process.";
pub const MSG_TRANSFORMED: &str = "Data transformation complete. Initiating loading process.";
pub const MSG_CSV_SAVED: &str = "Data saved to CSV file.";
pub const MSG_DB_CONNECTED: &str = "SQL connection initiated";
pub const MSG_DB_LOADED: &str = "Data loaded to Database as table. Running the query.";
pub const MSG_COMPLETE: &str = "Process Complete.";

pub fn format_entry(timestamp: DateTime<Local>, message: &str) -> String {
    format!("{}:{}\n", timestamp.format(TIMESTAMP_FORMAT), message)
}

#[derive(Debug, Clone)]
pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ProgressLog { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line; the file is created on first use
    pub fn log(&self, message: &str) -> EtlResult<()> {
        info!("{}", message);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| EtlError::io(format!("opening log {}", self.path.display()), e))?;

        file.write_all(format_entry(Local::now(), message).as_bytes())
            .map_err(|e| EtlError::io(format!("appending to log {}", self.path.display()), e))
    }
}

/// Install the stderr diagnostics subscriber
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;

    #[test]
    fn test_format_entry() {
        let ts = Local.with_ymd_and_hms(2023, 9, 8, 9, 16, 35).unwrap();

        assert_eq!(
            format_entry(ts, MSG_COMPLETE),
            "2023-Sep-08-09:16:35:Process Complete.\n"
        );
    }

    #[test]
    fn test_log_appends() {
        let dir = tempfile::tempdir().unwrap();
        let log = ProgressLog::new(dir.path().join("code_log.txt"));

        log.log(MSG_PRELIMINARIES).unwrap();
        log.log(MSG_EXTRACTED).unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(":Preliminaries complete. Initiating ETL process."));
        assert!(lines[1].ends_with(":Data extraction complete. Initiating Transformation process."));
    }

    #[test]
    fn test_log_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let log = ProgressLog::new(dir.path().join("no_such_dir").join("code_log.txt"));

        assert!(matches!(log.log(MSG_COMPLETE), Err(EtlError::Io { .. })));
    }
}
