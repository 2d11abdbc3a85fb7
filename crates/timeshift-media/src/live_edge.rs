//! Live edge tracking.
//!
//! For growing (non-VOD) recordings, tracks how far playback lags the live
//! edge. The live position comes from the streaming engine's live-sync
//! position when it reports one, otherwise from the latest buffered-edge
//! sample.

use timeshift_common::PlaylistKind;

/// Playback within this many seconds of the live position counts as live.
pub const AT_EDGE_THRESHOLD_SECS: f64 = 0.75;

/// Lagging more than this many seconds behind live offers a return to live.
pub const RETURN_TO_LIVE_THRESHOLD_SECS: f64 = 10.0;

/// Live position and lag for one sampling tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct LiveEdgeState {
    pub live_position: f64,
    /// `live_position - current_time`. Positive is behind live, negative is
    /// ahead (sync jitter).
    pub delta: f64,
    pub at_edge: bool,
}

impl LiveEdgeState {
    /// Short label for the live indicator: `LIVE`, `-12.3s` behind or
    /// `+0.9s` ahead.
    pub fn label(&self) -> String {
        if self.at_edge {
            "LIVE".to_string()
        } else if self.delta > 0.0 {
            format!("-{:.1}s", self.delta)
        } else {
            format!("+{:.1}s", -self.delta)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveEdgeTracker {
    at_edge_threshold: f64,
    return_to_live_threshold: f64,
}

impl Default for LiveEdgeTracker {
    fn default() -> Self {
        Self::new(AT_EDGE_THRESHOLD_SECS, RETURN_TO_LIVE_THRESHOLD_SECS)
    }
}

impl LiveEdgeTracker {
    pub fn new(at_edge_threshold: f64, return_to_live_threshold: f64) -> Self {
        Self {
            at_edge_threshold,
            return_to_live_threshold,
        }
    }

    pub fn at_edge_threshold(&self) -> f64 {
        self.at_edge_threshold
    }

    pub fn return_to_live_threshold(&self) -> f64 {
        self.return_to_live_threshold
    }

    /// Compute the live edge state for one tick.
    ///
    /// Returns `None` for VOD playlists and when neither a live-sync
    /// position nor a buffered edge is available.
    pub fn sample(
        &self,
        kind: PlaylistKind,
        current_time: f64,
        live_sync_position: Option<f64>,
        buffered_end: Option<f64>,
    ) -> Option<LiveEdgeState> {
        if !kind.is_live() || !current_time.is_finite() {
            return None;
        }
        let live_position = live_sync_position
            .filter(|p| p.is_finite())
            .or(buffered_end.filter(|p| p.is_finite()))?;

        let delta = live_position - current_time;
        Some(LiveEdgeState {
            live_position,
            delta,
            at_edge: delta.abs() < self.at_edge_threshold,
        })
    }

    /// Whether the "return to live" action should be offered.
    pub fn show_return_to_live(&self, state: &LiveEdgeState) -> bool {
        state.delta > self.return_to_live_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_edge_is_strict() {
        let tracker = LiveEdgeTracker::default();
        let state = |current| {
            tracker
                .sample(PlaylistKind::Event, current, Some(100.0), None)
                .unwrap()
        };

        assert!(state(100.0).at_edge);
        assert!(state(99.5).at_edge);
        assert!(state(100.5).at_edge);
        assert!(!state(99.25).at_edge);
        assert!(!state(100.75).at_edge);
        assert!(!state(90.0).at_edge);
    }

    #[test]
    fn test_negative_delta_is_kept() {
        let tracker = LiveEdgeTracker::default();
        let state = tracker
            .sample(PlaylistKind::Unknown, 101.5, Some(100.0), None)
            .unwrap();
        assert_eq!(state.delta, -1.5);
        assert!(!state.at_edge);
        assert_eq!(state.label(), "+1.5s");
    }

    #[test]
    fn test_live_sync_preferred_over_buffered_edge() {
        let tracker = LiveEdgeTracker::default();

        let state = tracker
            .sample(PlaylistKind::Event, 50.0, Some(80.0), Some(60.0))
            .unwrap();
        assert_eq!(state.live_position, 80.0);

        let state = tracker
            .sample(PlaylistKind::Event, 50.0, None, Some(60.0))
            .unwrap();
        assert_eq!(state.live_position, 60.0);
        assert_eq!(state.delta, 10.0);
    }

    #[test]
    fn test_vod_has_no_live_edge() {
        let tracker = LiveEdgeTracker::default();
        assert!(tracker
            .sample(PlaylistKind::Vod, 50.0, Some(80.0), Some(60.0))
            .is_none());
    }

    #[test]
    fn test_no_live_position() {
        let tracker = LiveEdgeTracker::default();
        assert!(tracker.sample(PlaylistKind::Event, 50.0, None, None).is_none());
        assert!(tracker
            .sample(PlaylistKind::Event, 50.0, Some(f64::NAN), None)
            .is_none());
    }

    #[test]
    fn test_return_to_live_threshold() {
        let tracker = LiveEdgeTracker::default();
        let behind = |delta: f64| LiveEdgeState {
            live_position: 100.0,
            delta,
            at_edge: false,
        };

        assert!(!tracker.show_return_to_live(&behind(10.0)));
        assert!(tracker.show_return_to_live(&behind(10.5)));
        assert!(!tracker.show_return_to_live(&behind(-20.0)));
    }

    #[test]
    fn test_custom_thresholds() {
        let tracker = LiveEdgeTracker::new(2.0, 30.0);
        let state = tracker
            .sample(PlaylistKind::Event, 98.5, Some(100.0), None)
            .unwrap();
        assert!(state.at_edge);
        assert_eq!(state.label(), "LIVE");
        assert!(!tracker.show_return_to_live(&LiveEdgeState {
            live_position: 100.0,
            delta: 20.0,
            at_edge: false,
        }));
    }

    #[test]
    fn test_behind_label() {
        let state = LiveEdgeState {
            live_position: 100.0,
            delta: 12.34,
            at_edge: false,
        };
        assert_eq!(state.label(), "-12.3s");
    }
}
