//! Values exposed to the UI layer, recomputed every sampling tick.

use crate::engine::SourceCapability;
use crate::player::PlayerSample;
use serde::Serialize;
use timeshift_common::{BufferedRanges, PlaylistKind};
use timeshift_media::{
    DateTimeBounds, DateTimeMapper, DvrWindow, DvrWindowResolver, EpochMillis, FragmentTimeline,
    LiveEdgeState, LiveEdgeTracker, ProgramTimeFormat, WindowSource,
};

/// Snapshot of everything the playback UI renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaybackView {
    pub kind: PlaylistKind,
    pub current_time: f64,
    pub window: DvrWindow,
    pub window_source: WindowSource,
    pub played_pct: f64,
    pub buffered_pct: f64,
    pub buffered_end: Option<f64>,
    /// Live edge state; `None` for VOD.
    pub live: Option<LiveEdgeState>,
    pub live_label: Option<String>,
    pub show_return_to_live: bool,
    pub program_time: Option<EpochMillis>,
    pub program_time_label: Option<String>,
    /// Range for constraining a date-time input.
    pub date_time_bounds: Option<DateTimeBounds>,
    pub fragments: usize,
}

/// Inputs for one tick.
pub struct ViewInputs<'a> {
    pub timeline: &'a FragmentTimeline,
    pub capability: SourceCapability,
    pub live_sync_position: Option<f64>,
    pub total_duration: Option<f64>,
    pub sample: &'a PlayerSample,
    pub tracker: &'a LiveEdgeTracker,
    pub label_format: &'a ProgramTimeFormat,
}

/// Resolve the DVR window, treating the timeline as engine metadata or as a
/// parsed playlist according to where it came from.
pub fn resolve_window(
    timeline: &FragmentTimeline,
    capability: SourceCapability,
    total_duration: Option<f64>,
    buffered: &BufferedRanges,
    current_time: Option<f64>,
) -> (DvrWindow, WindowSource) {
    let resolver = match capability {
        SourceCapability::NativeMetadata => DvrWindowResolver::new().engine_timeline(timeline),
        SourceCapability::PlaylistOnly => DvrWindowResolver::new().parsed_timeline(timeline),
    };
    resolver
        .buffered(buffered)
        .total_duration(total_duration)
        .buffered_end(buffered.end())
        .current_time(current_time)
        .resolve()
}

pub fn compute_view(inputs: &ViewInputs<'_>) -> PlaybackView {
    let timeline = inputs.timeline;
    let sample = inputs.sample;
    let current_time = sample.current_time;
    let buffered_end = sample.buffered.end();

    let (window, window_source) = resolve_window(
        timeline,
        inputs.capability,
        inputs.total_duration,
        &sample.buffered,
        Some(current_time),
    );

    let live = inputs.tracker.sample(
        timeline.kind(),
        current_time,
        inputs.live_sync_position,
        buffered_end,
    );

    let mapper = DateTimeMapper::new(timeline);
    let program_time = mapper.media_time_to_pdt(current_time);

    PlaybackView {
        kind: timeline.kind(),
        current_time,
        window,
        window_source,
        played_pct: window.played_pct(current_time),
        buffered_pct: buffered_end.map_or(0.0, |end| window.buffered_pct(end)),
        buffered_end,
        live_label: live.as_ref().map(LiveEdgeState::label),
        show_return_to_live: live
            .as_ref()
            .is_some_and(|state| inputs.tracker.show_return_to_live(state)),
        live,
        program_time,
        program_time_label: program_time.and_then(|ms| inputs.label_format.format(ms)),
        date_time_bounds: mapper.bounds(),
        fragments: timeline.len(),
    }
}
