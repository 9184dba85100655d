//! Job orchestration.
//!
//! This module provides the job lifecycle:
//! - creating a job from a selection and a destination root
//! - estimating the progress denominator by pre-walking the selection
//! - running the job to completion with per-item failure isolation
//!
//! A run is strictly sequential, one file at a time, in the order the caller
//! supplied items. Progress is counted per regular file: each file yields
//! exactly one outcome and one unit, and folder summaries are informational
//! events that never consume a unit, so the percentage denominator stays
//! balanced.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::detect;
use crate::error::EngineError;
use crate::events::{BackupEvent, EventSink};
use crate::fs_ops;
use crate::log::{LogSink, Severity};
use crate::model::{BackupJob, FileOutcome, FolderSummary, JobReport, JobState};

/// Create a new backup job.
///
/// The selection may contain stale paths; they are accepted here and surface
/// as `Failed` outcomes at run time. Only a structurally unusable job is
/// rejected up front.
pub fn create_job<P: AsRef<Path>>(items: Vec<PathBuf>, destination: P) -> Result<BackupJob, EngineError> {
    let destination = destination.as_ref();
    if destination.as_os_str().is_empty() {
        return Err(EngineError::InvalidJob {
            reason: "destination path is empty".to_string(),
        });
    }

    Ok(BackupJob {
        id: Uuid::new_v4(),
        items,
        destination: destination.to_path_buf(),
        state: JobState::Pending,
        total_units: 0,
        processed_units: 0,
        created_at: SystemTime::now(),
        start_time: None,
        end_time: None,
    })
}

/// Compute the progress denominator for a selection.
///
/// One unit per standalone regular file; one unit per regular file found by
/// a full recursive walk of each directory item. An item that does not exist
/// (race or bad path) contributes zero and surfaces as a failure during the
/// main pass instead of here.
pub fn estimate_total_units(items: &[PathBuf]) -> u64 {
    items
        .iter()
        .map(|item| {
            if item.is_file() {
                1
            } else if item.is_dir() {
                fs_ops::count_files(item)
            } else {
                0
            }
        })
        .sum()
}

/// Run a job to completion.
///
/// Processes items in caller order, emitting ordered progress events through
/// `events` and one log line per outcome through `log`. Every per-file or
/// per-item error is isolated and recorded; nothing short of misuse stops
/// the run, and the terminal `Completed` event fires unconditionally, even
/// when every item failed.
///
/// # Errors
/// Returns `EngineError::InvalidJob` when the job is not in the `Pending`
/// state (e.g. it already ran). All other errors become `Failed` outcomes.
pub fn run_job(
    job: &mut BackupJob,
    events: Option<&dyn EventSink>,
    log: Option<&dyn LogSink>,
) -> Result<JobReport, EngineError> {
    if job.state != JobState::Pending {
        return Err(EngineError::InvalidJob {
            reason: format!("job must be pending to run; current state: {:?}", job.state),
        });
    }

    job.state = JobState::Running;
    job.start_time = Some(SystemTime::now());
    job.total_units = estimate_total_units(&job.items);
    debug!(job = %job.id, items = job.items.len(), total_units = job.total_units, "starting backup run");

    let mut ctx = RunContext::new(job.total_units, events, log);

    for item in &job.items {
        if item.is_file() {
            match mirror_target(&job.destination, item) {
                Some(dst) => {
                    let outcome = mirror_file(item, &dst);
                    ctx.record_file(item, &dst, &outcome);
                }
                None => ctx.record_item_failure(item, "item has no file name to mirror under the destination"),
            }
        } else if item.is_dir() {
            mirror_folder(item, &job.destination, &mut ctx);
        } else {
            let reason = EngineError::PathVanished { path: item.clone() }.to_string();
            ctx.record_item_failure(item, &reason);
        }
    }

    ctx.log(
        Severity::Info,
        &format!(
            "Backup run completed: {} copied, {} skipped, {} failed",
            ctx.report.copied, ctx.report.skipped, ctx.report.failed
        ),
    );
    ctx.emit(BackupEvent::Completed);

    job.processed_units = ctx.report.processed_units;
    job.state = JobState::Completed;
    job.end_time = Some(SystemTime::now());
    debug!(job = %job.id, processed = job.processed_units, "backup run finished");

    Ok(ctx.report)
}

/// Map a top-level item to its destination path: `destination/basename(item)`.
fn mirror_target(destination: &Path, item: &Path) -> Option<PathBuf> {
    item.file_name().map(|name| destination.join(name))
}

/// Evaluate one source file against its destination path.
fn mirror_file(src: &Path, dst: &Path) -> FileOutcome {
    match detect::needs_copy(src, dst) {
        Ok(false) => FileOutcome::Skipped,
        Ok(true) => match fs_ops::copy_file_preserving(src, dst) {
            Ok(_) => FileOutcome::Copied,
            Err(e) => FileOutcome::Failed(e.to_string()),
        },
        Err(e) => FileOutcome::Failed(EngineError::from_read(src, e).to_string()),
    }
}

/// Mirror one top-level directory item, then emit its folder summary.
fn mirror_folder(folder: &Path, destination: &Path, ctx: &mut RunContext<'_>) {
    let Some(target) = mirror_target(destination, folder) else {
        ctx.record_item_failure(folder, "directory has no name to mirror under the destination");
        return;
    };

    let mut summary = FolderSummary::new(folder.to_path_buf());
    let existed = target.is_dir();

    match fs_ops::ensure_dir_exists(&target) {
        Ok(()) => {
            if !existed {
                ctx.note(format!("Created folder {}", target.display()));
            }
            mirror_dir_contents(folder, &target, ctx, &mut summary);
        }
        Err(e) => {
            // The mirrored root is unusable: every file under the source
            // directory is reported as failed rather than silently dropped,
            // which also keeps processed units equal to the estimate.
            let reason = e.to_string();
            warn!(folder = %folder.display(), %reason, "failing whole subtree");
            fail_subtree(folder, &reason, ctx, &mut summary);
        }
    }

    ctx.emit_summary(summary);
}

/// Depth-first walk of `src_dir`, mirroring every regular file into
/// `dst_dir` at the same relative path. Sibling order is
/// filesystem-dependent and not guaranteed stable.
fn mirror_dir_contents(
    src_dir: &Path,
    dst_dir: &Path,
    ctx: &mut RunContext<'_>,
    summary: &mut FolderSummary,
) {
    let entries = match fs::read_dir(src_dir) {
        Ok(entries) => entries,
        Err(e) => {
            let reason = EngineError::from_read(src_dir, e).to_string();
            ctx.record_item_failure(src_dir, &reason);
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let reason = EngineError::from_read(src_dir, e).to_string();
                ctx.record_item_failure(src_dir, &reason);
                continue;
            }
        };

        let path = entry.path();
        let kind = match entry.file_type() {
            Ok(kind) => kind,
            Err(e) => {
                let reason = EngineError::from_read(&path, e).to_string();
                ctx.record_item_failure(&path, &reason);
                continue;
            }
        };

        if kind.is_dir() {
            // Destination subdirectories are created lazily by the first
            // file copied into them; empty source directories are not
            // materialized at the destination.
            mirror_dir_contents(&path, &dst_dir.join(entry.file_name()), ctx, summary);
        } else if kind.is_file() {
            summary.detected += 1;
            let dst = dst_dir.join(entry.file_name());
            let outcome = mirror_file(&path, &dst);
            summary.apply(&outcome);
            ctx.record_file(&path, &dst, &outcome);
        }
        // Symlinks and special files are not mirrored; the pre-walk did not
        // count them either, so skipping here keeps the denominator intact.
    }
}

/// Report every regular file under `src_dir` as failed with `reason`,
/// consuming one unit each, exactly as the estimate counted them.
fn fail_subtree(src_dir: &Path, reason: &str, ctx: &mut RunContext<'_>, summary: &mut FolderSummary) {
    let entries = match fs::read_dir(src_dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        match entry.file_type() {
            Ok(kind) if kind.is_dir() => fail_subtree(&entry.path(), reason, ctx, summary),
            Ok(kind) if kind.is_file() => {
                summary.detected += 1;
                let path = entry.path();
                let outcome = FileOutcome::Failed(reason.to_string());
                summary.apply(&outcome);
                ctx.record_file(&path, &path, &outcome);
            }
            _ => {}
        }
    }
}

/// Mutable accounting state for one run: counters, event emission and
/// log-line rendering. Owned exclusively by the running job; observers see
/// it only through emitted events.
struct RunContext<'a> {
    events: Option<&'a dyn EventSink>,
    log: Option<&'a dyn LogSink>,
    report: JobReport,
}

impl<'a> RunContext<'a> {
    fn new(total_units: u64, events: Option<&'a dyn EventSink>, log: Option<&'a dyn LogSink>) -> Self {
        RunContext {
            events,
            log,
            report: JobReport {
                total_units,
                ..JobReport::default()
            },
        }
    }

    /// Integer percentage, floored. An empty denominator pins the value at
    /// the defined terminal 100 instead of dividing by zero.
    fn percent(&self) -> u8 {
        if self.report.total_units == 0 {
            100
        } else {
            (self.report.processed_units * 100 / self.report.total_units) as u8
        }
    }

    fn emit(&self, event: BackupEvent) {
        if let Some(events) = self.events {
            events.emit(event);
        }
    }

    fn log(&self, severity: Severity, message: &str) {
        if let Some(log) = self.log {
            log.log(severity, message);
        }
    }

    /// Record one file outcome: exactly one progress unit, one log line and
    /// one progress event, regardless of whether the file copied, skipped
    /// or failed.
    fn record_file(&mut self, src: &Path, dst: &Path, outcome: &FileOutcome) {
        self.report.processed_units += 1;

        let (severity, message) = match outcome {
            FileOutcome::Copied => {
                self.report.copied += 1;
                (
                    Severity::Info,
                    format!("Copied {} to {}", src.display(), dst.display()),
                )
            }
            FileOutcome::Skipped => {
                self.report.skipped += 1;
                (Severity::Info, format!("Skipped {} (no changes)", src.display()))
            }
            FileOutcome::Failed(reason) => {
                self.report.failed += 1;
                self.report
                    .failures
                    .push((src.to_path_buf(), reason.clone()));
                (Severity::Warn, format!("Failed {} ({})", src.display(), reason))
            }
        };

        self.log(severity, &message);
        self.emit(BackupEvent::Progress {
            percent: self.percent(),
            message,
        });
    }

    /// Record a failure for a whole item (or an unreadable directory) that
    /// never held progress units. The percentage is unaffected.
    fn record_item_failure(&mut self, path: &Path, reason: &str) {
        self.report.failed += 1;
        self.report.failures.push((path.to_path_buf(), reason.to_string()));

        let message = format!("Failed {} ({})", path.display(), reason);
        warn!(path = %path.display(), reason, "item failed");
        self.log(Severity::Warn, &message);
        self.emit(BackupEvent::Progress {
            percent: self.percent(),
            message,
        });
    }

    /// Informational status line with no effect on counters.
    fn note(&self, message: String) {
        self.log(Severity::Info, &message);
        self.emit(BackupEvent::Progress {
            percent: self.percent(),
            message,
        });
    }

    fn emit_summary(&mut self, summary: FolderSummary) {
        self.log(
            Severity::Info,
            &format!(
                "Backup completed for folder {}: {} detected, {} copied, {} skipped, {} failed",
                summary.folder.display(),
                summary.detected,
                summary.copied,
                summary.skipped,
                summary.failed
            ),
        );
        self.emit(BackupEvent::FolderSummary(summary));
    }
}
