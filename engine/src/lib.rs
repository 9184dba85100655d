//! # Mirror Engine - Local Backup/Synchronization Library
//!
//! A headless engine that mirrors a user-selected set of files and
//! directories into a destination tree, skipping items that are already up
//! to date. Designed as the foundation for multiple shells (CLI, GUI,
//! automation).
//!
//! ## Overview
//!
//! The engine executes one [`BackupJob`] at a time, sequentially:
//! - metadata-only change detection (exact mtime + byte size)
//! - recursive directory mirroring that preserves relative structure
//! - per-file progress accounting with an ordered event stream
//! - per-item failure isolation: one failing file never aborts the run
//!
//! ## Basic Usage
//!
//! ```no_run
//! use engine::{create_job, run_job};
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut job = create_job(
//!     vec![PathBuf::from("/docs/report.txt"), PathBuf::from("/photos")],
//!     "/backup",
//! )?;
//!
//! // No sinks: run silently and inspect the report
//! let report = run_job(&mut job, None, None)?;
//! println!(
//!     "{} copied, {} skipped, {} failed",
//!     report.copied, report.skipped, report.failed
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - **model**: core data structures (BackupJob, FileOutcome, JobReport)
//! - **error**: error taxonomy and io::Error classification
//! - **detect**: the metadata-based change detector
//! - **fs_ops**: low-level filesystem operations
//! - **job**: job orchestration (create, estimate, run)
//! - **events**: the ordered progress event stream
//! - **log**: the injected log-sink seam

pub mod detect;
pub mod error;
pub mod events;
pub mod fs_ops;
pub mod job;
pub mod log;
pub mod model;

// Re-export main types and functions
pub use error::EngineError;
pub use events::{BackupEvent, ChannelSink, EventSink};
pub use job::{create_job, estimate_total_units, run_job};
pub use log::{LogSink, Severity};
pub use model::{BackupJob, FileOutcome, FolderSummary, JobReport, JobState};
