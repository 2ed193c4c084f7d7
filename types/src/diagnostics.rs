//! Per-item failure diagnostics.
//!
//! A failed retrieval never surfaces as an error to the caller. Instead the
//! fetcher records one [`DiagnosticEvent`] into whatever [`DiagnosticSink`]
//! it was handed.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Why a single item degraded to `image: None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The per-item timeout elapsed and the request was dropped.
    Timeout,
    /// Connection, TLS, or transport-level failure.
    Network,
    /// Non-success HTTP status.
    Status(u16),
    /// Body was not the JSON record we expected.
    Decode,
    /// Record parsed but the display attribute was absent or not a string.
    MissingDisplayField,
}

impl FailureKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::Status(_) => "status",
            Self::Decode => "decode",
            Self::MissingDisplayField => "missing_display_field",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "status {code}"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Failure context for one item: which handle, what went wrong, how long it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEvent {
    pub name: String,
    pub url: String,
    pub kind: FailureKind,
    pub message: String,
    pub elapsed: Duration,
}

/// Destination for diagnostic events.
///
/// Passed explicitly to the fetcher so tests can observe failures without
/// any global state.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, event: DiagnosticEvent);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Arc<S> {
    fn record(&self, event: DiagnosticEvent) {
        (**self).record(event);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn record(&self, event: DiagnosticEvent) {
        (**self).record(event);
    }
}
