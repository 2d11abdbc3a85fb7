//! Player abstraction.
//!
//! The session never owns playback itself. It samples a [`PlayerHandle`] for
//! the current position and buffered ranges, and hands seek targets back to
//! it.

use parking_lot::Mutex;
use timeshift_common::{BufferedRanges, Result, TimeRange};
use tokio::time::Instant;

/// One reading of the player's state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerSample {
    pub current_time: f64,
    pub buffered: BufferedRanges,
}

/// Handle to the underlying media player.
pub trait PlayerHandle: Send + Sync {
    /// Current position and buffered ranges, or `None` while the player is
    /// momentarily unavailable (e.g. being recreated).
    fn sample(&self) -> Option<PlayerSample>;

    /// Move playback to `media_time`.
    fn seek(&self, media_time: f64) -> Result<()>;
}

/// Player driven by a wall clock, used by `timeshift follow`.
///
/// Plays forward in real time from its last seek, never past the live edge
/// it was told about, and reports a buffer reaching `buffer_ahead` seconds
/// past the playhead.
pub struct SimulatedPlayer {
    state: Mutex<SimState>,
    buffer_ahead: f64,
}

struct SimState {
    anchor_time: f64,
    anchor_at: Instant,
    buffered_from: f64,
    live_edge: Option<f64>,
}

impl SimState {
    fn position(&self) -> f64 {
        let position = self.anchor_time + self.anchor_at.elapsed().as_secs_f64();
        match self.live_edge {
            Some(edge) => position.min(edge.max(self.anchor_time)),
            None => position,
        }
    }
}

impl SimulatedPlayer {
    pub fn new(start: f64, buffer_ahead: f64) -> Self {
        Self {
            state: Mutex::new(SimState {
                anchor_time: start,
                anchor_at: Instant::now(),
                buffered_from: start,
                live_edge: None,
            }),
            buffer_ahead,
        }
    }

    /// Latest media time available to play.
    pub fn set_live_edge(&self, edge: Option<f64>) {
        self.state.lock().live_edge = edge.filter(|e| e.is_finite());
    }
}

impl PlayerHandle for SimulatedPlayer {
    fn sample(&self) -> Option<PlayerSample> {
        let state = self.state.lock();
        let current_time = state.position();

        let mut buffered_end = current_time + self.buffer_ahead;
        if let Some(edge) = state.live_edge {
            buffered_end = buffered_end.min(edge).max(current_time);
        }

        Some(PlayerSample {
            current_time,
            buffered: BufferedRanges::from(vec![TimeRange::new(state.buffered_from, buffered_end)]),
        })
    }

    fn seek(&self, media_time: f64) -> Result<()> {
        if !media_time.is_finite() {
            return Err(timeshift_common::Error::invalid_input(format!(
                "seek target {} is not a finite media time",
                media_time
            )));
        }

        let mut state = self.state.lock();
        let buffered_end = state.position() + self.buffer_ahead;
        if media_time < state.buffered_from || media_time > buffered_end {
            state.buffered_from = media_time;
        }
        state.anchor_time = media_time;
        state.anchor_at = Instant::now();
        tracing::debug!(media_time, "Simulated player seeked");
        Ok(())
    }
}
