//! Errors surfaced by session operations.

/// Failure of an explicit session operation such as a seek.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The seek request was rejected by the planner.
    #[error(transparent)]
    Seek(#[from] timeshift_media::Error),

    /// Session runtime failure (closed session, engine fault).
    #[error(transparent)]
    Runtime(#[from] timeshift_common::Error),
}

impl SessionError {
    /// Whether the session had already ended.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Runtime(timeshift_common::Error::SessionClosed))
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
