//! Log event types and submission parsing

use serde::Deserialize;

/// Severity of a log event.
///
/// The set is open-ended: levels we do not recognize parse to `Unknown`
/// and flow through the pipeline without contributing to error counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    Unknown,
}

impl Severity {
    /// Parse a wire-level severity string. Never fails: unrecognized
    /// levels map to `Unknown` so the event is still consumed downstream.
    pub fn parse(level: &str) -> Self {
        if level.eq_ignore_ascii_case("debug") {
            Severity::Debug
        } else if level.eq_ignore_ascii_case("info") {
            Severity::Info
        } else if level.eq_ignore_ascii_case("warn") || level.eq_ignore_ascii_case("warning") {
            Severity::Warn
        } else if level.eq_ignore_ascii_case("error") {
            Severity::Error
        } else {
            Severity::Unknown
        }
    }

    /// Whether this severity denotes an error condition worth aggregating.
    pub fn is_error(self) -> bool {
        matches!(self, Severity::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single log occurrence flowing through the pipeline.
///
/// Immutable once constructed; owned by whichever stage currently holds it
/// (submission boundary, queue buffer, then exactly one worker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub message: String,
    pub severity: Severity,
    pub origin: String,
}

impl LogEvent {
    pub fn new(message: impl Into<String>, severity: Severity, origin: impl Into<String>) -> Self {
        Self { message: message.into(), severity, origin: origin.into() }
    }
}

/// Wire format for a log submission (`POST /log` body).
///
/// Fields default to empty when absent; only payloads that fail to parse
/// as JSON are malformed.
#[derive(Debug, Deserialize)]
pub struct LogSubmission {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub source: String,
}

/// Parse a raw submission payload into a domain event.
///
/// Returns `None` for payloads that are not well-formed JSON. Malformed
/// input never reaches the queue; unknown severity levels do, as `Unknown`.
pub fn parse_submission(raw: &[u8]) -> Option<LogEvent> {
    let submission: LogSubmission = serde_json::from_slice(raw).ok()?;
    Some(LogEvent {
        severity: Severity::parse(&submission.level),
        message: submission.message,
        origin: submission.source,
    })
}
