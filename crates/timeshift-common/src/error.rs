//! Common error types used throughout timeshift.
//!
//! This module provides a unified error type for the session runtime:
//! playlist fetch failures, I/O failures, streaming engine faults and
//! operations attempted on a session that has already been torn down.

/// Common error type for timeshift.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Fetching the playlist failed. Recovered by the next poll.
    #[error("Playlist fetch failed: {0}")]
    Fetch(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The streaming engine reported an unrecoverable fault.
    #[error("Fatal engine error: {0}")]
    Engine(String),

    /// The playback session has already ended.
    #[error("Session closed")]
    SessionClosed,

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new Fetch error.
    pub fn fetch<S: Into<String>>(msg: S) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new Engine error.
    pub fn engine<S: Into<String>>(msg: S) -> Self {
        Self::Engine(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the failure is absorbed by the next refresh rather than
    /// surfaced to the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Io(_))
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
