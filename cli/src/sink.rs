//! Append-only file log sink.
//!
//! Implements the engine's `LogSink` seam: one timestamped line per event,
//! successes and failures alike. Write errors are swallowed; a full disk
//! under the log file must not take the backup down with it.

use chrono::Local;
use engine::{LogSink, Severity};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

pub struct FileLogSink {
    file: Mutex<File>,
}

impl FileLogSink {
    /// Open (or create) the log file for appending.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(FileLogSink {
            file: Mutex::new(file),
        })
    }
}

impl LogSink for FileLogSink {
    fn log(&self, severity: Severity, message: &str) {
        let line = format!(
            "{} - {} - {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            severity,
            message
        );
        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn appends_one_timestamped_line_per_event() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("backup.log");

        let sink = FileLogSink::open(&path).expect("open");
        sink.log(Severity::Info, "Copied /a to /b");
        sink.log(Severity::Warn, "Failed /c (disk full)");

        let contents = fs::read_to_string(&path).expect("read log");
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(" - INFO - Copied /a to /b"));
        assert!(lines[1].contains(" - WARNING - Failed /c (disk full)"));
    }

    #[test]
    fn reopening_appends_instead_of_truncating() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("backup.log");

        FileLogSink::open(&path)
            .expect("open")
            .log(Severity::Info, "first run");
        FileLogSink::open(&path)
            .expect("reopen")
            .log(Severity::Info, "second run");

        let contents = fs::read_to_string(&path).expect("read log");
        assert_eq!(contents.lines().count(), 2);
    }
}
