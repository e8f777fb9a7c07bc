//! Error types
//!
//! Connection calls fail with [`FetchError`]. Failures scoped to a single
//! resource ([`ResourceError`], [`CyclicValueError`]) are recovered by the
//! dump and only logged. [`DumpError`] is fatal for the whole dump.

use thiserror::Error;

/// Failure of a single call against the management endpoint
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The request never produced a reply (connect refused, timeout, TLS)
    #[error("transport error: {0}")]
    Transport(String),

    /// The agent answered with a non-200 status
    #[error("remote error {status}: {message}")]
    Remote {
        status: u16,
        error_type: Option<String>,
        message: String,
    },

    /// The configured agent URL cannot be used
    #[error("invalid agent URL: {0}")]
    InvalidUrl(String),

    /// The endpoint does not support the requested operation
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// The reply could not be understood
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    /// HTTP-style status of the failure, if the agent reported one
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Per-resource failures that the dump recovers from
#[derive(Debug, Clone, Error)]
pub enum ResourceError {
    /// Introspection of the resource failed, so none of its attributes are known
    #[error("resource {resource} unreachable: {source}")]
    Unreachable {
        resource: String,
        #[source]
        source: FetchError,
    },

    /// One attribute could not be read even on its own
    #[error("attribute {attribute} of {resource} unreadable: {source}")]
    AttributeUnreadable {
        resource: String,
        attribute: String,
        #[source]
        source: FetchError,
    },
}

/// A value nested deeper than the configured bound, taken to be self-referential
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("value nesting exceeds {limit} levels, self-referential value suspected")]
pub struct CyclicValueError {
    pub limit: usize,
}

/// Failures that abort the whole dump
#[derive(Debug, Error)]
pub enum DumpError {
    /// The agent refused to list resources
    #[error("resource directory unavailable: {0}")]
    DirectoryUnavailable(#[source] FetchError),

    /// The agent could not be reached at all
    #[error("connection lost: {0}")]
    ConnectionLost(#[source] FetchError),
}

impl DumpError {
    /// Classify a failed resource listing
    pub fn from_directory(error: FetchError) -> Self {
        match error {
            FetchError::Transport(_) => DumpError::ConnectionLost(error),
            other => DumpError::DirectoryUnavailable(other),
        }
    }
}
