//! Timeshift - live/DVR timeline reconciliation for growing HLS recordings
//!
//! This library crate exposes the session runtime for the CLI and for
//! integration testing. The pure timeline computations live in
//! `timeshift-media`.

pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod player;
pub mod session;

pub use error::{Result, SessionError};
pub use session::{PlaybackView, Session, SessionOptions};
