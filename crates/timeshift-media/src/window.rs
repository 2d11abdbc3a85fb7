//! DVR window resolution.
//!
//! The DVR window is the currently seekable `[start, end]` range of media
//! time. It is resolved once per sampling tick from whichever source is
//! available, in priority order:
//!
//! 1. fragment metadata reported by the streaming engine
//! 2. the manually parsed playlist timeline
//! 3. buffered time ranges from the media pipeline
//! 4. a degenerate `[0, max(buffered_end, current_time)]`
//!
//! `[0, 0]` is only returned before any sample exists.

use timeshift_common::BufferedRanges;

use crate::timeline::FragmentTimeline;

/// Seekable media-time range for one sampling tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct DvrWindow {
    pub start: f64,
    pub end: f64,
}

impl DvrWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Playback position as a percentage of the window, in `[0, 100]`.
    pub fn played_pct(&self, current_time: f64) -> f64 {
        self.percent_of(current_time)
    }

    /// Buffered edge as a percentage of the window, in `[0, 100]`.
    pub fn buffered_pct(&self, buffered_end: f64) -> f64 {
        self.percent_of(buffered_end)
    }

    /// Media time at `fraction` of the window.
    pub fn at_fraction(&self, fraction: f64) -> f64 {
        self.start + fraction * self.length()
    }

    fn percent_of(&self, value: f64) -> f64 {
        let length = self.length();
        if length.is_nan() || length <= 0.0 || !value.is_finite() {
            return 0.0;
        }
        ((value - self.start) / length).clamp(0.0, 1.0) * 100.0
    }
}

/// Which input the window was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialize",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum WindowSource {
    Engine,
    Playlist,
    Buffered,
    Degenerate,
    #[default]
    Empty,
}

/// Resolves the DVR window from the inputs available this tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct DvrWindowResolver<'a> {
    engine_timeline: Option<&'a FragmentTimeline>,
    parsed_timeline: Option<&'a FragmentTimeline>,
    buffered: Option<&'a BufferedRanges>,
    total_duration: Option<f64>,
    buffered_end: Option<f64>,
    current_time: Option<f64>,
}

impl<'a> DvrWindowResolver<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fragment metadata from the streaming engine.
    pub fn engine_timeline(mut self, timeline: &'a FragmentTimeline) -> Self {
        self.engine_timeline = Some(timeline);
        self
    }

    /// Timeline parsed from the playlist text.
    pub fn parsed_timeline(mut self, timeline: &'a FragmentTimeline) -> Self {
        self.parsed_timeline = Some(timeline);
        self
    }

    pub fn buffered(mut self, buffered: &'a BufferedRanges) -> Self {
        self.buffered = Some(buffered);
        self
    }

    /// Total-duration field reported by the engine or media element.
    pub fn total_duration(mut self, duration: Option<f64>) -> Self {
        self.total_duration = duration;
        self
    }

    /// Latest buffered-edge sample.
    pub fn buffered_end(mut self, end: Option<f64>) -> Self {
        self.buffered_end = end;
        self
    }

    pub fn current_time(mut self, t: Option<f64>) -> Self {
        self.current_time = t;
        self
    }

    pub fn resolve(&self) -> (DvrWindow, WindowSource) {
        let timelines = [
            (self.engine_timeline, WindowSource::Engine),
            (self.parsed_timeline, WindowSource::Playlist),
        ];
        for (timeline, source) in timelines {
            if let Some(start) = timeline.and_then(FragmentTimeline::start) {
                let end = self.resolve_end(start, timeline.and_then(FragmentTimeline::end));
                return (DvrWindow::new(start, end), source);
            }
        }

        if let Some(ranges) = self.buffered.filter(|r| !r.is_empty()) {
            if let (Some(start), Some(end)) = (ranges.start(), ranges.end()) {
                return (DvrWindow::new(start, end), WindowSource::Buffered);
            }
        }

        let samples = [self.buffered_end, self.current_time];
        let edge = samples
            .into_iter()
            .flatten()
            .filter(|v| v.is_finite())
            .reduce(f64::max);
        match edge {
            Some(edge) => (DvrWindow::new(0.0, edge.max(0.0)), WindowSource::Degenerate),
            None => (DvrWindow::default(), WindowSource::Empty),
        }
    }

    /// Last fragment end, then total duration, then buffered edge: the first
    /// that lies beyond `start`.
    fn resolve_end(&self, start: f64, fragment_end: Option<f64>) -> f64 {
        [fragment_end, self.total_duration, self.buffered_end]
            .into_iter()
            .flatten()
            .find(|end| end.is_finite() && *end > start)
            .unwrap_or(start)
    }
}
