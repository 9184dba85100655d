//! Log sink seam.
//!
//! The engine writes one log line per file outcome and per folder summary
//! through an injected `LogSink`, never through ambient global state. The
//! shell decides where lines go (a file, stderr, nowhere). Severity maps
//! straight onto the outcome: successes and skips are `Info`, failures
//! are `Warn`.

use std::fmt;

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warn => write!(f, "WARNING"),
        }
    }
}

/// An append-only, line-oriented log destination.
pub trait LogSink: Send {
    fn log(&self, severity: Severity, message: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_renders_log_level_names() {
        assert_eq!(Severity::Info.to_string(), "INFO");
        assert_eq!(Severity::Warn.to_string(), "WARNING");
    }
}
