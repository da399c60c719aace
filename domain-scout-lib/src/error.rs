//! Error handling for domain probing operations.
//!
//! Batch-level structural problems (`InvalidInput`, `IncompleteResult`) are
//! returned to the caller. Everything that goes wrong while probing a single
//! candidate is converted into that candidate's `Unknown` outcome instead, so
//! those variants mostly travel as diagnostics.

use std::time::Duration;
use thiserror::Error;

/// Main error type for domain probing operations.
#[derive(Debug, Clone, Error)]
pub enum ScoutError {
    /// Malformed base-name or suffix list handed to the expander
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Transport failure while probing one candidate (DNS or WHOIS)
    #[error("Network error for '{candidate}': {message}")]
    ProbeNetwork { candidate: String, message: String },

    /// WHOIS answered, but not in a form we can classify
    #[error("Unparseable WHOIS response for '{candidate}': {message}")]
    ProbeParse { candidate: String, message: String },

    /// A network step did not finish within its deadline
    #[error("Timeout after {duration:?} during: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// The WHOIS server refused to answer because of query volume
    #[error("Rate limited by {server}: {message}")]
    RateLimited { server: String, message: String },

    /// The aggregator did not receive exactly one outcome per candidate
    #[error("Incomplete result: expected {expected} outcomes, received {received} ({detail})")]
    IncompleteResult {
        expected: usize,
        received: usize,
        detail: String,
    },

    /// Invalid settings in a config file or environment variable
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Config file could not be read
    #[error("File error at '{path}': {message}")]
    File { path: String, message: String },

    /// The upstream name suggestion step failed
    #[error("Name suggestion failed: {message}")]
    Suggestion { message: String },

    /// Anything that doesn't fit the categories above
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ScoutError {
    /// Create a new invalid input error.
    pub fn invalid_input<R: Into<String>>(reason: R) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create a new probe network error.
    pub fn network<C: Into<String>, M: Into<String>>(candidate: C, message: M) -> Self {
        Self::ProbeNetwork {
            candidate: candidate.into(),
            message: message.into(),
        }
    }

    /// Create a new probe parse error.
    pub fn parse<C: Into<String>, M: Into<String>>(candidate: C, message: M) -> Self {
        Self::ProbeParse {
            candidate: candidate.into(),
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a new rate limit error.
    pub fn rate_limited<S: Into<String>, M: Into<String>>(server: S, message: M) -> Self {
        Self::RateLimited {
            server: server.into(),
            message: message.into(),
        }
    }

    /// Create a new incomplete result error.
    pub fn incomplete<D: Into<String>>(expected: usize, received: usize, detail: D) -> Self {
        Self::IncompleteResult {
            expected,
            received,
            detail: detail.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::File {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new suggestion error.
    pub fn suggestion<M: Into<String>>(message: M) -> Self {
        Self::Suggestion {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error belongs to a single candidate's probe and should be
    /// folded into an `Unknown` outcome rather than fail the batch.
    pub fn is_probe_error(&self) -> bool {
        matches!(
            self,
            Self::ProbeNetwork { .. }
                | Self::ProbeParse { .. }
                | Self::Timeout { .. }
                | Self::RateLimited { .. }
        )
    }

    /// Check if this error suggests the operation could succeed on a later run.
    ///
    /// The core never retries on its own; this is exposed for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProbeNetwork { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }
}

impl From<std::io::Error> for ScoutError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

impl From<serde_json::Error> for ScoutError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal {
            message: format!("JSON serialization failed: {}", err),
        }
    }
}
