//! Error types.
//!
//! [`FetchError`] describes why one retrieval failed; the detail fetcher turns
//! it into a diagnostic instead of returning it. [`ListingError`] is returned
//! to the caller because a failed listing leaves nothing to degrade.

use std::error::Error as _;
use std::fmt::Write;
use std::time::Duration;

use randex_types::FailureKind;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no response within {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("request failed")]
    Network(#[source] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),

    #[error("response body is not valid JSON")]
    Decode(#[source] serde_json::Error),

    #[error("record has no string at {pointer}")]
    MissingDisplayField { pointer: String },
}

impl FetchError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout(_) => FailureKind::Timeout,
            Self::Client(_) | Self::Network(_) => FailureKind::Network,
            Self::Status(status) => FailureKind::Status(status.as_u16()),
            Self::Decode(_) => FailureKind::Decode,
            Self::MissingDisplayField { .. } => FailureKind::MissingDisplayField,
        }
    }

    /// Display text followed by each cause in the source chain.
    #[must_use]
    pub fn full_message(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            let _ = write!(message, ": {cause}");
            source = cause.source();
        }
        message
    }
}

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("invalid listing endpoint {url}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("listing request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: FetchError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("display pointer must be empty or start with '/', got {0:?}")]
    InvalidPointer(String),

    #[error("timeout must be greater than zero")]
    ZeroTimeout,
}
