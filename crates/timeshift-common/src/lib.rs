//! Timeshift-Common: Shared types, constants, and utilities.
//!
//! This crate provides common functionality used across timeshift:
//!
//! - **Core Types**: Playlist kinds and media time ranges
//! - **Error Handling**: Session-level error types and result aliases
//!
//! # Examples
//!
//! ```
//! use timeshift_common::{BufferedRanges, PlaylistKind, TimeRange};
//!
//! let buffered = BufferedRanges::from(vec![TimeRange::new(40.0, 55.0)]);
//! assert_eq!(buffered.end(), Some(55.0));
//! assert!(PlaylistKind::Event.is_live());
//! ```

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
