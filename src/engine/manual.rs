use super::{SourceCapability, TimelineProvider, TimelineStore};
use crate::fetch::PlaylistFetcher;
use std::sync::Arc;
use std::time::Duration;
use timeshift_common::{Error, Result};
use timeshift_media::{hls, FragmentTimeline};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Fetch and parse the playlist once.
///
/// Text that is not a media playlist, such as a proxy error page served with
/// a 2xx status, is a fetch error so the previous timeline is kept.
pub async fn poll_once(fetcher: &dyn PlaylistFetcher) -> Result<FragmentTimeline> {
    let text = fetcher.fetch().await?;
    hls::check_media_playlist(&text)
        .map_err(|reason| Error::fetch(format!("{}: {}", fetcher.source(), reason)))?;
    Ok(hls::parse_media_playlist(&text))
}

/// Timeline maintained by polling the playlist text.
#[derive(Clone)]
pub struct ManualPlaylistProvider {
    store: Arc<TimelineStore>,
}

impl ManualPlaylistProvider {
    /// Spawn the poll loop.
    ///
    /// Polls never overlap: the next one is scheduled `interval` after the
    /// previous fetch-and-parse resolved. A failed poll keeps the previous
    /// timeline. Cancellation stops the timer; a fetch already in flight
    /// finishes but its result is dropped.
    pub fn spawn(
        fetcher: Arc<dyn PlaylistFetcher>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let store = Arc::new(TimelineStore::new());
        let handle = tokio::spawn(poll_loop(fetcher, store.clone(), interval, cancel));
        (Self { store }, handle)
    }

    pub fn generation(&self) -> u64 {
        self.store.generation()
    }
}

impl TimelineProvider for ManualPlaylistProvider {
    fn capability(&self) -> SourceCapability {
        SourceCapability::PlaylistOnly
    }

    fn timeline(&self) -> Arc<FragmentTimeline> {
        self.store.snapshot()
    }

    fn live_position(&self) -> Option<f64> {
        None
    }
}

async fn poll_loop(
    fetcher: Arc<dyn PlaylistFetcher>,
    store: Arc<TimelineStore>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(source = %fetcher.source(), "Playlist poll started");

    loop {
        let result = poll_once(fetcher.as_ref()).await;

        if cancel.is_cancelled() {
            tracing::debug!("Session ended during fetch, discarding result");
            break;
        }

        match result {
            Ok(timeline) => {
                let ended = timeline.is_ended();
                store.replace(timeline);
                if ended {
                    tracing::info!(source = %fetcher.source(), "Playlist ended, polling stopped");
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(source = %fetcher.source(), "Playlist refresh failed: {}", e);
            }
        }

        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    tracing::debug!(source = %fetcher.source(), "Playlist poll stopped");
}
