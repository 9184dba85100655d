//! Error types for the mirroring engine.
//!
//! `EngineError` covers the full per-file error taxonomy plus the one misuse
//! case (`InvalidJob`). Per-file errors never escalate: `run_job` renders
//! them into `Failed` outcomes at the smallest possible scope and keeps
//! going. The only error a caller sees from `run_job` itself is `InvalidJob`.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors produced while mirroring a single file or item.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The source file or directory could not be read.
    #[error("source unreadable: {} ({source})", path.display())]
    SourceUnreadable { path: PathBuf, source: io::Error },

    /// The destination file could not be created or written.
    #[error("destination unwritable: {} ({source})", path.display())]
    DestinationUnwritable { path: PathBuf, source: io::Error },

    /// The destination filesystem ran out of space or quota.
    #[error("filesystem full while writing {}", path.display())]
    FilesystemFull { path: PathBuf, source: io::Error },

    /// A destination directory could not be created. Fails the whole
    /// subtree that would have lived under it.
    #[error("failed to create directory {} ({source})", path.display())]
    DirectoryCreateFailed { path: PathBuf, source: io::Error },

    /// The path was deleted or became inaccessible between selection
    /// and the run. A runtime condition, not a bug.
    #[error("path no longer exists or is not accessible: {}", path.display())]
    PathVanished { path: PathBuf },

    /// Job-level misuse, e.g. running a job that already ran.
    #[error("invalid job: {reason}")]
    InvalidJob { reason: String },
}

impl EngineError {
    /// Classify an I/O error raised while reading the source side.
    pub fn from_read(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::PathVanished {
                path: path.to_path_buf(),
            },
            _ => Self::SourceUnreadable {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// Classify an I/O error raised while writing the destination side.
    pub fn from_write(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::StorageFull | io::ErrorKind::QuotaExceeded => Self::FilesystemFull {
                path: path.to_path_buf(),
                source: err,
            },
            _ => Self::DestinationUnwritable {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_not_found_becomes_path_vanished() {
        let err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let classified = EngineError::from_read(Path::new("/src/a.txt"), err);
        assert!(matches!(classified, EngineError::PathVanished { .. }));
    }

    #[test]
    fn read_permission_denied_becomes_source_unreadable() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let classified = EngineError::from_read(Path::new("/src/a.txt"), err);
        assert!(matches!(classified, EngineError::SourceUnreadable { .. }));
    }

    #[test]
    fn write_storage_full_becomes_filesystem_full() {
        let err = io::Error::new(io::ErrorKind::StorageFull, "full");
        let classified = EngineError::from_write(Path::new("/dst/a.txt"), err);
        assert!(matches!(classified, EngineError::FilesystemFull { .. }));
    }

    #[test]
    fn write_permission_denied_becomes_destination_unwritable() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let classified = EngineError::from_write(Path::new("/dst/a.txt"), err);
        assert!(matches!(classified, EngineError::DestinationUnwritable { .. }));
    }
}
