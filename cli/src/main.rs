//! mirror - command-line shell for the backup engine.
//!
//! This is the presentation layer: it assembles the selection (from
//! arguments or a saved JSON record), validates the destination root once up
//! front, runs the engine on a background thread, and renders the ordered
//! event stream to stderr. Detailed per-file reasons go to the optional log
//! file; the terminal gets a progress bar and an aggregate summary.

mod selection;
mod sink;

use clap::Parser;
use crossbeam_channel::unbounded;
use engine::{create_job, run_job, BackupEvent, ChannelSink, JobReport, LogSink};
use std::io::Write;
use std::path::PathBuf;
use std::thread;

use selection::SelectionState;
use sink::FileLogSink;

/// mirror - back up files and folders into a destination tree
#[derive(Parser, Debug)]
#[command(name = "mirror")]
#[command(version = "0.1.0")]
#[command(about = "Mirror files and directories into a destination, skipping unchanged items")]
struct Args {
    /// Files and folders to back up, processed in this order
    #[arg(value_name = "PATH")]
    items: Vec<PathBuf>,

    /// Destination directory
    #[arg(long, value_name = "PATH")]
    dest: Option<PathBuf>,

    /// JSON file with a saved selection ({"items": [...], "destination_folder": ...})
    #[arg(long, value_name = "FILE")]
    selection: Option<PathBuf>,

    /// Write the effective selection back to the --selection file after the run
    #[arg(long, requires = "selection")]
    save_selection: bool,

    /// Append one timestamped line per event to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Print every status line instead of a single progress bar
    #[arg(long)]
    verbose: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let exit_code = match run_cli(&args) {
        Ok(report) if report.has_failures() => {
            eprintln!("One or more items failed to back up (see the log for reasons)");
            1
        }
        Ok(_) => 0,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            2
        }
    };

    std::process::exit(exit_code);
}

/// Main CLI logic - separated for testability.
fn run_cli(args: &Args) -> Result<JobReport, String> {
    let saved = match &args.selection {
        Some(path) if path.exists() => Some(
            SelectionState::load(path)
                .map_err(|e| format!("Failed to read selection file {}: {}", path.display(), e))?,
        ),
        _ => None,
    };

    // Arguments override the saved selection
    let items = if !args.items.is_empty() {
        args.items.clone()
    } else {
        saved.as_ref().map(|s| s.items.clone()).unwrap_or_default()
    };
    if items.is_empty() {
        return Err("No items to back up; pass paths or a --selection file".to_string());
    }

    let dest = args
        .dest
        .clone()
        .or_else(|| saved.as_ref().and_then(|s| s.destination_folder.clone()))
        .filter(|d| !d.as_os_str().is_empty())
        .ok_or_else(|| "No destination set; pass --dest or a selection with one".to_string())?;

    // Validate the destination root once, before constructing the job; a
    // fundamentally unusable root is the one condition that stops everything.
    std::fs::create_dir_all(&dest)
        .map_err(|e| format!("Destination {} is not usable: {}", dest.display(), e))?;

    let log_sink = match &args.log_file {
        Some(path) => Some(
            FileLogSink::open(path)
                .map_err(|e| format!("Cannot open log file {}: {}", path.display(), e))?,
        ),
        None => None,
    };

    let mut job = create_job(items.clone(), &dest).map_err(|e| e.to_string())?;

    // The engine runs as a background unit of work; this thread stays
    // responsive and renders events in the order they were emitted.
    let (tx, rx) = unbounded();
    let worker = thread::spawn(move || {
        let events = ChannelSink::new(tx);
        let log: Option<&dyn LogSink> = log_sink.as_ref().map(|s| s as &dyn LogSink);
        run_job(&mut job, Some(&events), log).map_err(|e| e.to_string())
    });

    for event in rx.iter() {
        render_event(&event, args.verbose);
    }

    let report = worker
        .join()
        .map_err(|_| "backup worker panicked".to_string())?
        .map_err(|e| format!("Job execution failed: {}", e))?;

    print_summary(&report);

    if args.save_selection {
        if let Some(path) = &args.selection {
            let state = SelectionState {
                items,
                destination_folder: Some(dest),
            };
            state
                .save(path)
                .map_err(|e| format!("Failed to save selection {}: {}", path.display(), e))?;
        }
    }

    Ok(report)
}

fn render_event(event: &BackupEvent, verbose: bool) {
    match event {
        BackupEvent::Progress { percent, message } => {
            if verbose {
                eprintln!("[{:3}%] {}", percent, message);
            } else {
                eprint!("\r{}", progress_bar(*percent));
                let _ = std::io::stderr().flush();
            }
        }
        BackupEvent::FolderSummary(summary) => {
            if verbose {
                eprintln!(
                    "Folder {}: {} detected, {} copied, {} skipped, {} failed",
                    summary.folder.display(),
                    summary.detected,
                    summary.copied,
                    summary.skipped,
                    summary.failed
                );
            }
        }
        BackupEvent::Completed => {
            if !verbose {
                eprint!("\r{}", progress_bar(100));
            }
            eprintln!();
        }
    }
}

fn print_summary(report: &JobReport) {
    eprintln!("Backup complete!");
    eprintln!(
        "Summary: {} copied, {} skipped, {} failed ({}/{} files processed)",
        report.copied, report.skipped, report.failed, report.processed_units, report.total_units
    );

    if !report.failures.is_empty() {
        eprintln!();
        eprintln!("Failed items:");
        for (path, reason) in &report.failures {
            eprintln!("  {}: {}", path.display(), reason);
        }
    }
}

fn progress_bar(percent: u8) -> String {
    let filled = (percent / 5) as usize;
    let empty = 20usize.saturating_sub(filled);
    format!("[{}{}] {:3}%", "=".repeat(filled), " ".repeat(empty), percent)
}
