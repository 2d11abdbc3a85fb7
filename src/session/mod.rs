//! Playback session.
//!
//! A [`Session`] owns everything with a lifetime tied to one playback: the
//! timeline provider task, the sampling loop and the cancellation token that
//! stops both. Dropping the session cancels them on every exit path.

mod sampler;
pub mod view;

pub use view::{compute_view, resolve_window, PlaybackView, ViewInputs};

use crate::config::Config;
use crate::engine::{start_provider, TimelineProvider, TimelineSource};
use crate::error::Result;
use crate::player::{PlayerHandle, PlayerSample};
use sampler::Sampler;
use std::sync::Arc;
use std::time::Duration;
use timeshift_media::{
    ConfirmOutOfWindow, FragmentTimeline, LiveEdgeTracker, ProgramTimeFormat, SeekPlan,
    SeekPlanner, SeekRequest,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Tunables for one session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub poll_interval: Duration,
    pub sample_interval: Duration,
    pub seek_safety_margin: f64,
    pub tracker: LiveEdgeTracker,
    pub label_format: ProgramTimeFormat,
}

impl SessionOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: config.session.poll_interval(),
            sample_interval: config.session.sample_interval(),
            seek_safety_margin: config.session.seek_safety_margin_secs,
            tracker: config.live_edge.tracker(),
            label_format: config.display.program_time_format(),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub struct Session {
    id: Uuid,
    provider: Arc<dyn TimelineProvider>,
    player: Arc<dyn PlayerHandle>,
    seek_safety_margin: f64,
    view_rx: watch::Receiver<PlaybackView>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl Session {
    /// Start a session. Must be called within a tokio runtime.
    pub fn start(
        source: TimelineSource,
        player: Arc<dyn PlayerHandle>,
        options: SessionOptions,
    ) -> Self {
        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let capability = source.capability();

        let (provider, provider_task) =
            start_provider(source, options.poll_interval, cancel.child_token());

        let (view_tx, view_rx) = watch::channel(PlaybackView::default());
        let sampler = Sampler {
            provider: provider.clone(),
            player: player.clone(),
            tracker: options.tracker,
            label_format: options.label_format.clone(),
            view_tx,
        };
        let sampler_task = tokio::spawn(sampler.run(options.sample_interval, cancel.child_token()));

        tracing::info!(
            session_id = %id,
            capability = ?capability,
            "Playback session started"
        );

        Self {
            id,
            provider,
            player,
            seek_safety_margin: options.seek_safety_margin,
            view_rx,
            cancel,
            tasks: vec![provider_task, sampler_task],
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Latest playback view.
    pub fn view(&self) -> PlaybackView {
        self.view_rx.borrow().clone()
    }

    /// Receiver notified whenever the playback view changes.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackView> {
        self.view_rx.clone()
    }

    /// Current timeline snapshot.
    pub fn timeline(&self) -> Arc<FragmentTimeline> {
        self.provider.timeline()
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Plan a seek against the current snapshot and hand the target to the
    /// player.
    ///
    /// Fails without side effects when the request is rejected, including
    /// when `confirm` declines snapping an out-of-window timestamp.
    pub fn seek(
        &self,
        request: &SeekRequest,
        confirm: &mut (impl ConfirmOutOfWindow + ?Sized),
    ) -> Result<SeekPlan> {
        if self.is_closed() {
            return Err(timeshift_common::Error::SessionClosed.into());
        }

        let timeline = self.provider.timeline();
        let sample = self.player.sample().unwrap_or_else(|| PlayerSample {
            current_time: self.view_rx.borrow().current_time,
            ..Default::default()
        });
        let (window, _) = resolve_window(
            &timeline,
            self.provider.capability(),
            self.provider.total_duration(),
            &sample.buffered,
            Some(sample.current_time),
        );

        let plan = SeekPlanner::new(&timeline, window, &sample.buffered)
            .with_safety_margin(self.seek_safety_margin)
            .plan(request, confirm)?;

        self.player.seek(plan.target_media_time)?;
        tracing::info!(
            session_id = %self.id,
            target = plan.target_media_time,
            out_of_window = plan.out_of_window,
            "Seek"
        );
        Ok(plan)
    }

    /// Cancel background work and wait for it to stop.
    ///
    /// A playlist fetch already in flight is allowed to finish; its result is
    /// discarded.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        for task in std::mem::take(&mut self.tasks) {
            if let Err(e) = task.await {
                tracing::warn!(session_id = %self.id, "Session task failed: {}", e);
            }
        }
        tracing::info!(session_id = %self.id, "Playback session ended");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
