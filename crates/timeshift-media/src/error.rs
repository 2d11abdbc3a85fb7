//! Error types for timeshift-media.
//!
//! Only explicit user actions (seeks) fail. Parsing and sampling absorb
//! their own problems and degrade to partial results instead.

use thiserror::Error;

use crate::datetime::DateTimeBounds;
use crate::timeline::EpochMillis;

/// Result type for timeshift-media operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for seek planning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The requested timestamp could not be parsed.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestampInput(String),

    /// No fragment in the timeline carries a program date-time.
    #[error("Stream has no program date-time data")]
    NoTimestampData,

    /// The timestamp is within bounds but could not be mapped to media time.
    #[error("No media time available for timestamp {0}")]
    TimestampUnavailable(EpochMillis),

    /// The timestamp lies outside the recording and the caller declined to
    /// snap it to the nearest bound.
    #[error("Timestamp {requested} is outside the recording ({}..{})", .bounds.min, .bounds.max)]
    OutOfWindowDeclined {
        requested: EpochMillis,
        bounds: DateTimeBounds,
    },
}

impl Error {
    /// Create an invalid timestamp error.
    pub fn invalid_timestamp(input: impl Into<String>) -> Self {
        Self::InvalidTimestampInput(input.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::invalid_timestamp("noon").to_string(),
            "Invalid timestamp: noon"
        );
        assert_eq!(
            Error::NoTimestampData.to_string(),
            "Stream has no program date-time data"
        );

        let declined = Error::OutOfWindowDeclined {
            requested: 50,
            bounds: DateTimeBounds { min: 100, max: 200 },
        };
        assert_eq!(
            declined.to_string(),
            "Timestamp 50 is outside the recording (100..200)"
        );
    }
}
