//! Core type definitions shared by the timeline core and the session runtime.
//!
//! All enums are serialized in lowercase so the playback view can be handed
//! to a UI layer as JSON without further mapping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of media playlist, as declared by its playlist-type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistKind {
    /// Fixed-length recording, fully known upfront.
    Vod,
    /// Growing recording; fragments are only ever appended.
    Event,
    /// No (or an unrecognised) playlist-type tag.
    #[default]
    Unknown,
}

impl PlaylistKind {
    /// Interpret the value of a playlist-type tag.
    ///
    /// Anything other than `VOD` or `EVENT` leaves the kind unknown.
    pub fn from_tag_value(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("VOD") {
            Self::Vod
        } else if value.eq_ignore_ascii_case("EVENT") {
            Self::Event
        } else {
            Self::Unknown
        }
    }

    /// Whether a live edge applies to this kind of playlist.
    pub fn is_live(self) -> bool {
        self != Self::Vod
    }
}

impl fmt::Display for PlaylistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vod => write!(f, "vod"),
            Self::Event => write!(f, "event"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for PlaylistKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vod" => Ok(Self::Vod),
            "event" => Ok(Self::Event),
            "unknown" => Ok(Self::Unknown),
            _ => Err(format!("Invalid playlist kind: {}", s)),
        }
    }
}

/// A contiguous span of media time, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Length of the range; never negative.
    pub fn len(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0.0
    }

    /// Whether `t` lies within the range, both ends inclusive.
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }
}

/// Buffered time ranges reported by the media pipeline, ordered by start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BufferedRanges(Vec<TimeRange>);

impl BufferedRanges {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeRange> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Start of the earliest buffered range.
    pub fn start(&self) -> Option<f64> {
        self.0.first().map(|r| r.start)
    }

    /// Furthest buffered position (the buffered edge). Ranges may overlap,
    /// so this is the maximum end rather than the end of the last range.
    pub fn end(&self) -> Option<f64> {
        self.0.iter().map(|r| r.end).reduce(f64::max)
    }

    /// The range containing `t`, if any.
    pub fn containing(&self, t: f64) -> Option<&TimeRange> {
        self.0.iter().find(|r| r.contains(t))
    }
}

impl From<Vec<TimeRange>> for BufferedRanges {
    fn from(mut ranges: Vec<TimeRange>) -> Self {
        ranges.retain(|r| r.start.is_finite() && r.end.is_finite() && r.start <= r.end);
        ranges.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self(ranges)
    }
}

impl FromIterator<TimeRange> for BufferedRanges {
    fn from_iter<I: IntoIterator<Item = TimeRange>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlist_kind_from_tag_value() {
        assert_eq!(PlaylistKind::from_tag_value("VOD"), PlaylistKind::Vod);
        assert_eq!(PlaylistKind::from_tag_value("EVENT"), PlaylistKind::Event);
        assert_eq!(PlaylistKind::from_tag_value(" event "), PlaylistKind::Event);
        assert_eq!(PlaylistKind::from_tag_value("LIVE"), PlaylistKind::Unknown);
        assert_eq!(PlaylistKind::from_tag_value(""), PlaylistKind::Unknown);
    }

    #[test]
    fn test_playlist_kind_is_live() {
        assert!(!PlaylistKind::Vod.is_live());
        assert!(PlaylistKind::Event.is_live());
        assert!(PlaylistKind::Unknown.is_live());
    }

    #[test]
    fn test_playlist_kind_serialization() {
        let json = serde_json::to_string(&PlaylistKind::Event).unwrap();
        assert_eq!(json, r#""event""#);

        let kind: PlaylistKind = serde_json::from_str(r#""vod""#).unwrap();
        assert_eq!(kind, PlaylistKind::Vod);
        assert_eq!("unknown".parse::<PlaylistKind>(), Ok(PlaylistKind::Unknown));
        assert!("live".parse::<PlaylistKind>().is_err());
    }

    #[test]
    fn test_time_range_contains_inclusive() {
        let range = TimeRange::new(40.0, 55.0);
        assert!(range.contains(40.0));
        assert!(range.contains(55.0));
        assert!(!range.contains(55.01));
        assert_eq!(range.len(), 15.0);
        assert!(TimeRange::new(5.0, 5.0).is_empty());
    }

    #[test]
    fn test_buffered_ranges_sorted_and_filtered() {
        let ranges = BufferedRanges::from(vec![
            TimeRange::new(60.0, 70.0),
            TimeRange::new(f64::NAN, 3.0),
            TimeRange::new(10.0, 20.0),
            TimeRange::new(30.0, 25.0),
        ]);

        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges.start(), Some(10.0));
        assert_eq!(ranges.end(), Some(70.0));
        assert_eq!(ranges.containing(65.0), Some(&TimeRange::new(60.0, 70.0)));
        assert!(ranges.containing(25.0).is_none());
    }

    #[test]
    fn test_buffered_ranges_end_with_overlap() {
        let ranges = BufferedRanges::from(vec![
            TimeRange::new(0.0, 20.0),
            TimeRange::new(5.0, 10.0),
        ]);
        assert_eq!(ranges.end(), Some(20.0));

        let nested = BufferedRanges::from(vec![
            TimeRange::new(30.0, 35.0),
            TimeRange::new(0.0, 100.0),
            TimeRange::new(40.0, 50.0),
        ]);
        assert_eq!(nested.end(), Some(100.0));
    }

    #[test]
    fn test_buffered_ranges_empty() {
        let ranges = BufferedRanges::new();
        assert!(ranges.is_empty());
        assert_eq!(ranges.end(), None);
    }
}
