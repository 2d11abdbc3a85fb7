//! Program date-time mapping.
//!
//! Translates between media time (seconds into the fragment timeline) and
//! absolute program time (epoch milliseconds). Only fragments carrying a
//! program date-time act as anchors; fragments without one stay in the
//! timeline and are covered by extrapolating from the nearest earlier anchor.
//!
//! Both directions bisect the timeline and assume it is sorted ascending,
//! which [`FragmentTimeline::new`] guarantees for start times. Program
//! date-times are expected to ascend with them; that is not re-checked here.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, Utc};

use crate::timeline::{EpochMillis, FragmentTimeline};

/// Parse an ISO-8601 timestamp into epoch milliseconds.
///
/// Accepts RFC 3339 (`2024-01-01T00:00:00Z`, `+01:00`), the `+0100` offset
/// form written by ffmpeg's HLS muxer, and zone-less values, which are read
/// as UTC. A single space may stand in for the `T` separator.
pub fn parse_timestamp(value: &str) -> Option<EpochMillis> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let normalized = value.replacen(' ', "T", 1);

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.timestamp_millis());
    }
    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// Render epoch milliseconds as an RFC 3339 timestamp with millisecond
/// precision, e.g. `2024-01-01T00:00:06.000Z`.
pub fn format_rfc3339(ms: EpochMillis) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn secs_to_millis(secs: f64) -> EpochMillis {
    (secs * 1000.0).round() as EpochMillis
}

/// Range of program time covered by the timeline's anchored fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct DateTimeBounds {
    pub min: EpochMillis,
    pub max: EpochMillis,
}

impl DateTimeBounds {
    pub fn contains(&self, ms: EpochMillis) -> bool {
        self.min <= ms && ms <= self.max
    }

    /// The bound nearest to `ms`, or `ms` itself when it is inside.
    pub fn clamp(&self, ms: EpochMillis) -> EpochMillis {
        ms.clamp(self.min, self.max)
    }
}

/// Bidirectional media-time / program-time mapping over one timeline snapshot.
#[derive(Debug, Clone, Copy)]
pub struct DateTimeMapper<'a> {
    timeline: &'a FragmentTimeline,
}

impl<'a> DateTimeMapper<'a> {
    pub fn new(timeline: &'a FragmentTimeline) -> Self {
        Self { timeline }
    }

    /// Program time spanned by the anchored fragments.
    ///
    /// `min` is the first anchor's date-time, `max` the last anchor's
    /// date-time plus its duration. `None` when no fragment is anchored.
    pub fn bounds(&self) -> Option<DateTimeBounds> {
        let first = self.timeline.anchors().next()?;
        let last = self.timeline.anchors().last()?;
        Some(DateTimeBounds {
            min: first.program_date_time?,
            max: last
                .program_date_time?
                .saturating_add(secs_to_millis(last.duration)),
        })
    }

    /// Program time at media time `t`.
    ///
    /// Anchors on the nearest PDT-bearing fragment at or before the fragment
    /// containing `t`; when there is none, extrapolates from the first anchor
    /// in the timeline.
    pub fn media_time_to_pdt(&self, t: f64) -> Option<EpochMillis> {
        if !t.is_finite() {
            return None;
        }
        let anchors = self.timeline.anchor_indices();
        let fallback = *anchors.first()?;

        let anchor_index = self
            .timeline
            .index_at(t)
            .and_then(|index| {
                anchors
                    .partition_point(|&a| a <= index)
                    .checked_sub(1)
                    .map(|k| anchors[k])
            })
            .unwrap_or(fallback);

        let anchor = &self.timeline.fragments()[anchor_index];
        let pdt = anchor.program_date_time?;
        Some(pdt.saturating_add(secs_to_millis((t - anchor.start).max(0.0))))
    }

    /// Media time at program time `target`.
    ///
    /// Anchors on the last PDT-bearing fragment with a date-time at or before
    /// `target` and never overshoots that fragment's own span. The result is
    /// clamped into the timeline. `None` when no fragment is anchored.
    pub fn pdt_to_media_time(&self, target: EpochMillis) -> Option<f64> {
        let fragments = self.timeline.fragments();
        let anchors = self.timeline.anchor_indices();
        if anchors.is_empty() {
            return None;
        }

        let k = anchors.partition_point(|&i| {
            fragments[i]
                .program_date_time
                .is_some_and(|pdt| pdt <= target)
        });
        let anchor = &fragments[anchors[k.saturating_sub(1)]];
        let pdt = anchor.program_date_time?;

        let offset = (target.saturating_sub(pdt) as f64 / 1000.0).max(0.0);
        let t = anchor.start + offset.min(anchor.duration);

        let lo = self.timeline.start()?;
        let hi = self.timeline.end()?.max(lo);
        Some(t.clamp(lo, hi))
    }
}

/// Time zone used when rendering program-time labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialize",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum LabelZone {
    #[default]
    Utc,
    Local,
}

/// Formats program time for display next to the seek bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramTimeFormat {
    pattern: String,
    zone: LabelZone,
}

impl ProgramTimeFormat {
    /// `pattern` is a chrono `strftime` pattern.
    pub fn new(pattern: impl Into<String>, zone: LabelZone) -> Self {
        Self {
            pattern: pattern.into(),
            zone,
        }
    }

    /// Whether `pattern` contains only recognised `strftime` specifiers.
    pub fn is_valid_pattern(pattern: &str) -> bool {
        !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
    }

    /// `None` when `ms` is out of chrono's range or the pattern cannot be
    /// rendered.
    pub fn format(&self, ms: EpochMillis) -> Option<String> {
        let utc = DateTime::<Utc>::from_timestamp_millis(ms)?;
        let mut label = String::new();
        let written = match self.zone {
            LabelZone::Utc => write!(label, "{}", utc.format(&self.pattern)),
            LabelZone::Local => write!(
                label,
                "{}",
                utc.with_timezone(&Local).format(&self.pattern)
            ),
        };
        written.ok().map(|_| label)
    }
}

impl Default for ProgramTimeFormat {
    fn default() -> Self {
        Self::new("%Y-%m-%d %H:%M:%S", LabelZone::Utc)
    }
}
