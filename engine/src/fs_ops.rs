//! Filesystem operations.
//!
//! Low-level helpers for the mirror engine:
//! - copying one file atomically with metadata preservation
//! - creating destination directories recursively
//! - pre-walking a tree to count regular files for the progress denominator

use crate::error::EngineError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Copy a file from `src` to `dst`, preserving the source modification time
/// and permission bits so future change-detection queries see a match.
///
/// The copy is effectively atomic per file: contents are staged in a hidden
/// sibling file and renamed into place only once fully written, so an abrupt
/// stop never leaves a partially-written destination file.
///
/// # Returns
/// Number of bytes copied
///
/// # Errors
/// Returns a classified `EngineError`; the caller isolates it to one file.
pub fn copy_file_preserving(src: &Path, dst: &Path) -> Result<u64, EngineError> {
    ensure_parent_dir_exists(dst)?;

    let src_meta = fs::metadata(src).map_err(|e| EngineError::from_read(src, e))?;
    let mtime = filetime::FileTime::from_last_modification_time(&src_meta);

    // Stage next to the final path so the rename stays on one filesystem.
    let staged = staging_path(dst);
    debug!(src = %src.display(), dst = %dst.display(), "copying file");

    let bytes = match fs::copy(src, &staged) {
        Ok(bytes) => bytes,
        Err(e) => {
            let _ = fs::remove_file(&staged);
            return Err(classify_copy_error(src, dst, e));
        }
    };

    if let Err(e) = filetime::set_file_mtime(&staged, mtime) {
        let _ = fs::remove_file(&staged);
        return Err(EngineError::from_write(dst, e));
    }

    if let Err(e) = fs::rename(&staged, dst) {
        let _ = fs::remove_file(&staged);
        return Err(EngineError::from_write(dst, e));
    }

    Ok(bytes)
}

/// Ensure `path` exists as a directory, creating it recursively if absent.
pub fn ensure_dir_exists(path: &Path) -> Result<(), EngineError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(EngineError::DirectoryCreateFailed {
            path: path.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                "path exists but is not a directory",
            ),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(path).map_err(|e| EngineError::DirectoryCreateFailed {
                path: path.to_path_buf(),
                source: e,
            })
        }
        Err(e) => Err(EngineError::DirectoryCreateFailed {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Ensure the parent directory of `path` exists, creating it if necessary.
pub fn ensure_parent_dir_exists(path: &Path) -> Result<(), EngineError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir_exists(parent),
        _ => Ok(()),
    }
}

/// Count the regular files under `dir`, recursively.
///
/// Unreadable directories count as zero here; the main pass reports them as
/// failures instead. Symlinks and special files are not mirrored and are
/// not counted.
pub fn count_files(dir: &Path) -> u64 {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "skipping unreadable directory in pre-walk");
            return 0;
        }
    };

    entries
        .flatten()
        .map(|entry| match entry.file_type() {
            Ok(kind) if kind.is_dir() => count_files(&entry.path()),
            Ok(kind) if kind.is_file() => 1,
            _ => 0,
        })
        .sum()
}

fn staging_path(dst: &Path) -> PathBuf {
    let name = dst
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    dst.with_file_name(format!(".{name}.partial"))
}

fn classify_copy_error(src: &Path, dst: &Path, err: io::Error) -> EngineError {
    match err.kind() {
        io::ErrorKind::NotFound => EngineError::PathVanished {
            path: src.to_path_buf(),
        },
        // Creation and write failures surface on the destination side
        io::ErrorKind::PermissionDenied
        | io::ErrorKind::StorageFull
        | io::ErrorKind::QuotaExceeded => EngineError::from_write(dst, err),
        _ => EngineError::SourceUnreadable {
            path: src.to_path_buf(),
            source: err,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{set_file_mtime, FileTime};

    #[test]
    fn copy_preserves_contents_and_mtime() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("source.txt");
        let dst = tmp.path().join("dest.txt");

        fs::write(&src, b"mirrored contents").expect("write src");
        set_file_mtime(&src, FileTime::from_unix_time(1_700_000_000, 0)).expect("set mtime");

        let bytes = copy_file_preserving(&src, &dst).expect("copy");
        assert_eq!(bytes, 17);
        assert_eq!(
            fs::read_to_string(&dst).expect("read dst"),
            "mirrored contents"
        );

        let src_mtime = FileTime::from_last_modification_time(&fs::metadata(&src).expect("meta"));
        let dst_mtime = FileTime::from_last_modification_time(&fs::metadata(&dst).expect("meta"));
        assert_eq!(src_mtime, dst_mtime);
    }

    #[test]
    fn copy_creates_missing_parent_directories() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("source.txt");
        let dst = tmp.path().join("a").join("b").join("dest.txt");
        fs::write(&src, b"x").expect("write src");

        copy_file_preserving(&src, &dst).expect("copy");
        assert!(dst.exists());
    }

    #[test]
    fn copy_leaves_no_staging_file_behind() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("source.txt");
        let dst = tmp.path().join("dest.txt");
        fs::write(&src, b"x").expect("write src");

        copy_file_preserving(&src, &dst).expect("copy");

        let leftovers: Vec<_> = fs::read_dir(tmp.path())
            .expect("read dir")
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().ends_with(".partial"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn copy_preserves_permission_bits() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("source.txt");
        let dst = tmp.path().join("dest.txt");
        fs::write(&src, b"x").expect("write src");
        fs::set_permissions(&src, fs::Permissions::from_mode(0o640)).expect("chmod");

        copy_file_preserving(&src, &dst).expect("copy");

        let mode = fs::metadata(&dst).expect("meta").permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    fn copy_missing_source_is_path_vanished() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("gone.txt");
        let dst = tmp.path().join("dest.txt");

        let err = copy_file_preserving(&src, &dst).expect_err("must fail");
        assert!(matches!(err, EngineError::PathVanished { .. }));
        assert!(!dst.exists());
    }

    #[test]
    fn ensure_dir_exists_creates_recursively() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let target = tmp.path().join("one").join("two");

        ensure_dir_exists(&target).expect("create");
        assert!(target.is_dir());

        // Idempotent on an existing directory
        ensure_dir_exists(&target).expect("recheck");
    }

    #[test]
    fn ensure_dir_exists_rejects_file_in_the_way() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let target = tmp.path().join("blocker");
        fs::write(&target, b"not a dir").expect("write");

        let err = ensure_dir_exists(&target).expect_err("must fail");
        assert!(matches!(err, EngineError::DirectoryCreateFailed { .. }));
    }

    #[test]
    fn count_files_walks_nested_tree() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let root = tmp.path().join("root");
        fs::create_dir_all(root.join("a").join("b")).expect("mkdirs");
        fs::create_dir_all(root.join("empty")).expect("mkdirs");
        fs::write(root.join("top.txt"), b"1").expect("write");
        fs::write(root.join("a").join("mid.txt"), b"2").expect("write");
        fs::write(root.join("a").join("b").join("deep.txt"), b"3").expect("write");

        assert_eq!(count_files(&root), 3);
    }

    #[test]
    fn count_files_on_missing_directory_is_zero() {
        let tmp = tempfile::tempdir().expect("tempdir");
        assert_eq!(count_files(&tmp.path().join("nope")), 0);
    }
}
