use super::view::{compute_view, PlaybackView, ViewInputs};
use crate::engine::TimelineProvider;
use crate::player::PlayerHandle;
use std::sync::Arc;
use std::time::Duration;
use timeshift_media::{LiveEdgeTracker, ProgramTimeFormat};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Continuous playback sampling loop.
pub(crate) struct Sampler {
    pub provider: Arc<dyn TimelineProvider>,
    pub player: Arc<dyn PlayerHandle>,
    pub tracker: LiveEdgeTracker,
    pub label_format: ProgramTimeFormat,
    pub view_tx: watch::Sender<PlaybackView>,
}

impl Sampler {
    pub async fn run(self, interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.tick();
                }
            }
        }

        tracing::debug!("Sampling loop stopped");
    }

    /// Sample the player once and publish the view if it changed.
    ///
    /// An unavailable player makes this a no-op.
    pub fn tick(&self) -> bool {
        let Some(sample) = self.player.sample() else {
            tracing::trace!("Player unavailable, skipping tick");
            return false;
        };

        let timeline = self.provider.timeline();
        let view = compute_view(&ViewInputs {
            timeline: &timeline,
            capability: self.provider.capability(),
            live_sync_position: self.provider.live_position(),
            total_duration: self.provider.total_duration(),
            sample: &sample,
            tracker: &self.tracker,
            label_format: &self.label_format,
        });

        self.view_tx.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        })
    }
}
