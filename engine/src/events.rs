//! Progress event stream.
//!
//! The engine reports progress through the `EventSink` trait, which decouples
//! it from any specific UI technology. Events are emitted synchronously in
//! the order the engine produces them, so any sink observes them in emission
//! order. `ChannelSink` adapts the trait to a crossbeam channel for shells
//! that consume events on another thread.

use crate::model::FolderSummary;
use crossbeam_channel::Sender;

/// A typed progress or completion event.
#[derive(Debug, Clone, PartialEq)]
pub enum BackupEvent {
    /// Running progress: the current percentage and a human-readable
    /// status line describing the file or item just handled.
    Progress { percent: u8, message: String },

    /// Informational per-folder counters, emitted after a top-level
    /// directory walk finishes. Carries no progress unit.
    FolderSummary(FolderSummary),

    /// Terminal event, emitted exactly once per run, even when every
    /// item failed.
    Completed,
}

/// Receives events during job execution.
///
/// All methods are called synchronously from the running job. Implementations
/// must not block for long; a slow sink stalls the copy loop.
pub trait EventSink: Send {
    fn emit(&self, event: BackupEvent);
}

/// An `EventSink` that forwards events into a crossbeam channel.
///
/// Send errors are ignored: a disconnected consumer must not abort a
/// running backup.
pub struct ChannelSink {
    sender: Sender<BackupEvent>,
}

impl ChannelSink {
    pub fn new(sender: Sender<BackupEvent>) -> Self {
        ChannelSink { sender }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: BackupEvent) {
        let _ = self.sender.send(event);
    }
}
