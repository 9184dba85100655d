//! Change detection.
//!
//! Decides whether a source file needs copying to a destination path using
//! metadata only: a file is considered unchanged when the destination exists
//! with the exact same modification timestamp and the same byte size.
//! Timestamps are compared for exact equality at the filesystem's native
//! resolution, not within a tolerance window.
//!
//! This trades perfect correctness (two distinct files could share size and
//! mtime) for never reading file contents, which keeps repeated runs over
//! large trees cheap. That tradeoff is inherited from the tool's design and
//! is not to be "fixed" with hashing.

use std::fs;
use std::io;
use std::path::Path;

/// Returns true when `source` must be copied to `dest`.
///
/// A missing destination is a valid, cheap "needs copy" signal and never an
/// error. Errors are only returned when metadata on the source (or on an
/// existing destination) cannot be read; the caller converts those into a
/// `Failed` outcome.
///
/// Pure query: never mutates filesystem state.
pub fn needs_copy(source: &Path, dest: &Path) -> io::Result<bool> {
    let dest_meta = match fs::metadata(dest) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(e),
    };
    let source_meta = fs::metadata(source)?;

    let same = source_meta.modified()? == dest_meta.modified()?
        && source_meta.len() == dest_meta.len();
    Ok(!same)
}
