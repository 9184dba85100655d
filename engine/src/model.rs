//! Core data model for backup jobs.
//!
//! This module defines the main data structures for one mirroring run:
//! - BackupJob: the ordered selection plus the destination root
//! - FileOutcome: the result of evaluating one source file
//! - FolderSummary: per-directory counters reported after a tree walk
//! - JobReport: the aggregate returned by `run_job`

use std::path::PathBuf;
use std::time::SystemTime;
use uuid::Uuid;

/// One mirroring run: an ordered selection of files and directories plus a
/// destination root.
///
/// Created once per run, immutable inputs for the duration of the run. The
/// selection may contain stale paths (deleted between selection and run);
/// those surface as `Failed` outcomes during execution, never as a panic.
#[derive(Debug)]
pub struct BackupJob {
    /// Unique identifier for this job
    pub id: Uuid,

    /// Files and directories to mirror, in caller-supplied order
    pub items: Vec<PathBuf>,

    /// Destination root directory
    pub destination: PathBuf,

    /// Current job state (Pending, Running, Completed)
    pub state: JobState,

    /// Progress denominator, computed once at run start by pre-walking
    /// the selection (one unit per regular file)
    pub total_units: u64,

    /// Progress numerator; incremented by exactly one per file outcome
    pub processed_units: u64,

    /// When the job was created
    pub created_at: SystemTime,

    /// When job execution started
    pub start_time: Option<SystemTime>,

    /// When job execution completed
    pub end_time: Option<SystemTime>,
}

/// The state of a backup job.
///
/// There is no `Failed` terminal state by design: partial failure is
/// reported through the event stream, and the job always runs to
/// completion across the remaining items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Created, not yet started
    Pending,
    /// Currently executing
    Running,
    /// All items processed (some may have failed)
    Completed,
}

/// The result of evaluating one source file.
///
/// Produced during traversal and consumed to build progress messages and
/// counters; not persisted anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Contents copied, modification time and permission bits preserved
    Copied,
    /// Destination already matches on size and modification time
    Skipped,
    /// A filesystem error was isolated to this file
    Failed(String),
}

impl FileOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, FileOutcome::Failed(_))
    }
}

/// Counters for one top-level directory, reported once its walk finishes.
///
/// Informational only: emitting a summary never consumes a progress unit,
/// so the percentage denominator stays balanced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderSummary {
    /// The source directory the walk covered
    pub folder: PathBuf,
    /// Regular files encountered by the walk
    pub detected: u64,
    pub copied: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl FolderSummary {
    pub fn new(folder: PathBuf) -> Self {
        FolderSummary {
            folder,
            detected: 0,
            copied: 0,
            skipped: 0,
            failed: 0,
        }
    }

    /// Fold one file outcome into the counters.
    pub fn apply(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Copied => self.copied += 1,
            FileOutcome::Skipped => self.skipped += 1,
            FileOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Aggregate result of one run, returned by `run_job`.
///
/// Lets a shell render a completion notice without replaying the event
/// stream. `failed` also counts whole items that vanished before the run
/// reached them, which by construction never held progress units.
#[derive(Debug, Clone, Default)]
pub struct JobReport {
    pub total_units: u64,
    pub processed_units: u64,
    pub copied: u64,
    pub skipped: u64,
    pub failed: u64,
    /// Per-failure detail: the path and a human-readable reason
    pub failures: Vec<(PathBuf, String)>,
}

impl JobReport {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_summary_folds_outcomes() {
        let mut summary = FolderSummary::new(PathBuf::from("/photos"));
        summary.apply(&FileOutcome::Copied);
        summary.apply(&FileOutcome::Skipped);
        summary.apply(&FileOutcome::Skipped);
        summary.apply(&FileOutcome::Failed("disk full".to_string()));

        assert_eq!(summary.copied, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn outcome_failure_predicate() {
        assert!(!FileOutcome::Copied.is_failed());
        assert!(!FileOutcome::Skipped.is_failed());
        assert!(FileOutcome::Failed("x".to_string()).is_failed());
    }
}
