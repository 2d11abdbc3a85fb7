//! Timeline providers.
//!
//! A session reads its fragment timeline from one of two providers, chosen
//! once at start from what the source can do:
//!
//! - [`NativeEngineProvider`] consumes fragment metadata and live-sync events
//!   pushed by a streaming engine.
//! - [`ManualPlaylistProvider`] polls the playlist text and parses it itself,
//!   for sources without native metadata.

mod manual;
mod native;
mod store;

pub use manual::{poll_once, ManualPlaylistProvider};
pub use native::{EngineStatus, NativeEngineProvider};
pub use store::TimelineStore;

use crate::fetch::PlaylistFetcher;
use std::sync::Arc;
use std::time::Duration;
use timeshift_common::{PlaylistKind, Result};
use timeshift_media::{Fragment, FragmentTimeline};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// What the playback source can report about its own timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceCapability {
    /// The streaming engine reports per-fragment metadata and live position.
    NativeMetadata,
    /// Only the playlist text is available.
    PlaylistOnly,
}

/// Read access to the session's timeline, whichever way it is maintained.
pub trait TimelineProvider: Send + Sync {
    fn capability(&self) -> SourceCapability;

    /// Current timeline snapshot.
    fn timeline(&self) -> Arc<FragmentTimeline>;

    /// Live-sync position reported by the engine, if any.
    fn live_position(&self) -> Option<f64>;

    /// Total duration reported by the engine, if any.
    fn total_duration(&self) -> Option<f64> {
        None
    }
}

/// Events pushed by a streaming engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Fragment metadata for the playing rendition was (re)loaded.
    LevelLoaded {
        kind: PlaylistKind,
        fragments: Vec<Fragment>,
        total_duration: Option<f64>,
    },
    /// The engine's live-sync position moved.
    LiveSync(f64),
    Fault(EngineFault),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    Network,
    Media,
    Other,
}

/// Fault reported by the streaming engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineFault {
    pub kind: FaultKind,
    pub fatal: bool,
    pub details: String,
}

/// Response to an engine fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultAction {
    /// Reload in place.
    RetryLoad,
    /// Attempt decoder recovery.
    RecoverMedia,
    /// Tear the engine down and start over.
    Reinitialize,
    /// Log and carry on.
    Ignore,
}

impl EngineFault {
    pub fn new(kind: FaultKind, fatal: bool, details: impl Into<String>) -> Self {
        Self {
            kind,
            fatal,
            details: details.into(),
        }
    }

    pub fn action(&self) -> FaultAction {
        match (self.fatal, self.kind) {
            (true, _) => FaultAction::Reinitialize,
            (false, FaultKind::Network) => FaultAction::RetryLoad,
            (false, FaultKind::Media) => FaultAction::RecoverMedia,
            (false, FaultKind::Other) => FaultAction::Ignore,
        }
    }
}

/// Commands accepted by the streaming engine.
#[async_trait::async_trait]
pub trait EngineControl: Send + Sync {
    /// Restart loading from the current position.
    async fn retry_load(&self) -> Result<()>;

    /// Attempt to recover the media pipeline after a decode fault.
    async fn recover_media(&self) -> Result<()>;

    /// Destroy and recreate the engine.
    async fn reinitialize(&self) -> Result<()>;
}

/// Where a session's timeline comes from.
pub enum TimelineSource {
    Native {
        events: mpsc::Receiver<EngineEvent>,
        control: Arc<dyn EngineControl>,
    },
    Playlist {
        fetcher: Arc<dyn PlaylistFetcher>,
    },
}

impl TimelineSource {
    pub fn capability(&self) -> SourceCapability {
        match self {
            Self::Native { .. } => SourceCapability::NativeMetadata,
            Self::Playlist { .. } => SourceCapability::PlaylistOnly,
        }
    }
}

/// Start the provider matching the source's capability.
///
/// Returns the provider and the task maintaining it. The task stops when
/// `cancel` fires.
pub fn start_provider(
    source: TimelineSource,
    poll_interval: Duration,
    cancel: CancellationToken,
) -> (Arc<dyn TimelineProvider>, JoinHandle<()>) {
    match source {
        TimelineSource::Native { events, control } => {
            let (provider, handle) = NativeEngineProvider::spawn(events, control, cancel);
            let provider: Arc<dyn TimelineProvider> = Arc::new(provider);
            (provider, handle)
        }
        TimelineSource::Playlist { fetcher } => {
            let (provider, handle) = ManualPlaylistProvider::spawn(fetcher, poll_interval, cancel);
            let provider: Arc<dyn TimelineProvider> = Arc::new(provider);
            (provider, handle)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_actions() {
        let fault = |kind, fatal| EngineFault::new(kind, fatal, "test").action();

        assert_eq!(fault(FaultKind::Network, false), FaultAction::RetryLoad);
        assert_eq!(fault(FaultKind::Media, false), FaultAction::RecoverMedia);
        assert_eq!(fault(FaultKind::Other, false), FaultAction::Ignore);
        assert_eq!(fault(FaultKind::Network, true), FaultAction::Reinitialize);
        assert_eq!(fault(FaultKind::Media, true), FaultAction::Reinitialize);
        assert_eq!(fault(FaultKind::Other, true), FaultAction::Reinitialize);
    }
}
