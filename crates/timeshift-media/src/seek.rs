//! Seek planning.
//!
//! Turns a user seek request into a target media time. Fraction requests
//! address the DVR window directly; timestamp requests go through the
//! program date-time mapping and may need the caller's confirmation when they
//! fall outside the recording.

use timeshift_common::BufferedRanges;

use crate::datetime::{parse_timestamp, DateTimeBounds, DateTimeMapper};
use crate::error::{Error, Result};
use crate::timeline::{EpochMillis, FragmentTimeline};
use crate::window::DvrWindow;

/// Distance kept from the end of a buffered range when landing inside it.
pub const SEEK_SAFETY_MARGIN_SECS: f64 = 0.25;

/// A user seek request.
#[derive(Debug, Clone, PartialEq)]
pub enum SeekRequest {
    /// Position within the DVR window, `0.0..=1.0`.
    Fraction(f64),
    /// Absolute timestamp as typed by the user (ISO-8601).
    Timestamp(String),
    /// Absolute program time in epoch milliseconds.
    ProgramTime(EpochMillis),
}

/// Validated seek target.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SeekPlan {
    pub target_media_time: f64,
    /// The request was outside its valid range and was pulled back in.
    pub was_clamped: bool,
    /// The request was outside the date-time bounds (and the caller
    /// confirmed snapping to the nearest bound).
    pub out_of_window: bool,
    /// The target was moved back from the edge of a buffered range.
    pub safety_adjusted: bool,
}

/// A timestamp request outside the recording's date-time bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfWindow {
    pub requested: EpochMillis,
    /// Bound the request would snap to.
    pub nearest: EpochMillis,
    pub bounds: DateTimeBounds,
}

/// Decides whether an out-of-window request snaps to the nearest bound.
///
/// Closures taking `&OutOfWindow` implement it. Planners borrow the
/// implementor, so state it keeps (a prompt, a counter) outlives the call.
pub trait ConfirmOutOfWindow {
    fn confirm(&mut self, condition: &OutOfWindow) -> bool;
}

impl<F> ConfirmOutOfWindow for F
where
    F: FnMut(&OutOfWindow) -> bool,
{
    fn confirm(&mut self, condition: &OutOfWindow) -> bool {
        self(condition)
    }
}

/// Move `target` away from the end of the buffered range it falls in.
///
/// Inside a range the result is `range.end - margin`, never below
/// `range.start`. Targets outside every range pass through unchanged.
pub fn apply_seek_safety(target: f64, buffered: &BufferedRanges, margin: f64) -> f64 {
    match buffered.containing(target) {
        Some(range) => (range.end - margin).max(range.start),
        None => target,
    }
}

/// Plans seeks against one timeline snapshot.
#[derive(Debug, Clone, Copy)]
pub struct SeekPlanner<'a> {
    timeline: &'a FragmentTimeline,
    window: DvrWindow,
    buffered: &'a BufferedRanges,
    safety_margin: f64,
}

impl<'a> SeekPlanner<'a> {
    pub fn new(
        timeline: &'a FragmentTimeline,
        window: DvrWindow,
        buffered: &'a BufferedRanges,
    ) -> Self {
        Self {
            timeline,
            window,
            buffered,
            safety_margin: SEEK_SAFETY_MARGIN_SECS,
        }
    }

    pub fn with_safety_margin(mut self, margin: f64) -> Self {
        self.safety_margin = margin;
        self
    }

    /// Plan any request. `confirm` is only consulted for timestamp requests
    /// outside the date-time bounds.
    pub fn plan(
        &self,
        request: &SeekRequest,
        confirm: &mut (impl ConfirmOutOfWindow + ?Sized),
    ) -> Result<SeekPlan> {
        match request {
            SeekRequest::Fraction(fraction) => Ok(self.plan_fraction(*fraction)),
            SeekRequest::Timestamp(input) => self.plan_timestamp(input, confirm),
            SeekRequest::ProgramTime(ms) => self.plan_program_time(*ms, confirm),
        }
    }

    /// Target at `fraction` of the DVR window. Always succeeds; fractions
    /// outside `[0, 1]` (or NaN) are clamped.
    pub fn plan_fraction(&self, fraction: f64) -> SeekPlan {
        let clamped = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        SeekPlan {
            target_media_time: self.window.at_fraction(clamped),
            was_clamped: clamped != fraction,
            out_of_window: false,
            safety_adjusted: false,
        }
    }

    /// Target for a user-typed timestamp.
    pub fn plan_timestamp(
        &self,
        input: &str,
        confirm: &mut (impl ConfirmOutOfWindow + ?Sized),
    ) -> Result<SeekPlan> {
        let requested = parse_timestamp(input).ok_or_else(|| Error::invalid_timestamp(input))?;
        self.plan_program_time(requested, confirm)
    }

    /// Target for an absolute program time.
    pub fn plan_program_time(
        &self,
        requested: EpochMillis,
        confirm: &mut (impl ConfirmOutOfWindow + ?Sized),
    ) -> Result<SeekPlan> {
        let mapper = DateTimeMapper::new(self.timeline);
        let bounds = mapper.bounds().ok_or(Error::NoTimestampData)?;

        let out_of_window = !bounds.contains(requested);
        let target = if out_of_window {
            let condition = OutOfWindow {
                requested,
                nearest: bounds.clamp(requested),
                bounds,
            };
            if !confirm.confirm(&condition) {
                tracing::debug!(requested, "Out-of-window seek declined");
                return Err(Error::OutOfWindowDeclined { requested, bounds });
            }
            condition.nearest
        } else {
            requested
        };

        let media_time = mapper
            .pdt_to_media_time(target)
            .ok_or(Error::TimestampUnavailable(target))?;
        let safe = apply_seek_safety(media_time, self.buffered, self.safety_margin);

        Ok(SeekPlan {
            target_media_time: safe,
            was_clamped: out_of_window,
            out_of_window,
            safety_adjusted: safe != media_time,
        })
    }
}
