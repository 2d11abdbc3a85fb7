//! Fragment timeline.
//!
//! A fragment timeline is the ordered list of segments currently known for a
//! recording, each optionally anchored to an absolute program date-time. It is
//! the snapshot every derived value (window, live edge, date-time mapping) is
//! computed from, and it is never patched in place: each refresh builds a new
//! timeline that replaces the previous one wholesale.

use timeshift_common::PlaylistKind;

/// Milliseconds since the Unix epoch.
pub type EpochMillis = i64;

/// A single segment of the media timeline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Fragment {
    /// Start in media time (seconds).
    pub start: f64,
    /// End in media time (seconds). Always `start + duration`.
    pub end: f64,
    /// Duration in seconds.
    pub duration: f64,
    /// Wall-clock time of the fragment's first frame.
    pub program_date_time: Option<EpochMillis>,
    /// Media sequence number, when known.
    pub sequence: Option<u64>,
    /// Segment URI as written in the playlist.
    pub uri: Option<String>,
    /// A discontinuity precedes this fragment.
    pub discontinuity: bool,
}

impl Fragment {
    /// Create a fragment spanning `[start, start + duration]`.
    pub fn new(start: f64, duration: f64) -> Self {
        Self {
            start,
            end: start + duration,
            duration,
            program_date_time: None,
            sequence: None,
            uri: None,
            discontinuity: false,
        }
    }

    pub fn with_program_date_time(mut self, pdt: Option<EpochMillis>) -> Self {
        self.program_date_time = pdt;
        self
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = Some(sequence);
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_discontinuity(mut self, discontinuity: bool) -> Self {
        self.discontinuity = discontinuity;
        self
    }

    /// Whether `t` falls inside `[start, end)`.
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }

    fn is_well_formed(&self) -> bool {
        self.start.is_finite() && self.duration.is_finite() && self.duration >= 0.0
    }

    fn same_span(&self, other: &Fragment) -> bool {
        self.start == other.start
            && self.duration == other.duration
            && self.program_date_time == other.program_date_time
    }
}

/// Ordered, immutable list of fragments plus playlist-level metadata.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct FragmentTimeline {
    kind: PlaylistKind,
    fragments: Vec<Fragment>,
    /// Indices of fragments that carry a program date-time.
    #[cfg_attr(feature = "serialize", serde(skip))]
    anchors: Vec<usize>,
    target_duration: Option<f64>,
    media_sequence: u64,
    ended: bool,
}

impl FragmentTimeline {
    /// Build a timeline from fragments in any order.
    ///
    /// Malformed fragments (non-finite start, negative duration) are dropped
    /// and the rest are sorted by start so bisection over the timeline holds.
    pub fn new(kind: PlaylistKind, fragments: Vec<Fragment>) -> Self {
        let total = fragments.len();
        let mut fragments: Vec<Fragment> = fragments
            .into_iter()
            .filter(Fragment::is_well_formed)
            .collect();
        if fragments.len() != total {
            tracing::debug!(
                dropped = total - fragments.len(),
                "Dropped malformed fragments from timeline"
            );
        }
        fragments.sort_by(|a, b| a.start.total_cmp(&b.start));

        let anchors = fragments
            .iter()
            .enumerate()
            .filter(|(_, f)| f.program_date_time.is_some())
            .map(|(i, _)| i)
            .collect();

        Self {
            kind,
            fragments,
            anchors,
            target_duration: None,
            media_sequence: 0,
            ended: false,
        }
    }

    /// An empty timeline of unknown kind.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_target_duration(mut self, target_duration: Option<f64>) -> Self {
        self.target_duration = target_duration;
        self
    }

    pub fn with_media_sequence(mut self, media_sequence: u64) -> Self {
        self.media_sequence = media_sequence;
        self
    }

    pub fn with_ended(mut self, ended: bool) -> Self {
        self.ended = ended;
        self
    }

    pub fn kind(&self) -> PlaylistKind {
        self.kind
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn first(&self) -> Option<&Fragment> {
        self.fragments.first()
    }

    pub fn last(&self) -> Option<&Fragment> {
        self.fragments.last()
    }

    /// Media time of the first fragment's start.
    pub fn start(&self) -> Option<f64> {
        self.first().map(|f| f.start)
    }

    /// Media time of the last fragment's end.
    pub fn end(&self) -> Option<f64> {
        self.last().map(|f| f.end)
    }

    /// Target duration declared by the playlist.
    pub fn target_duration(&self) -> Option<f64> {
        self.target_duration
    }

    /// Sequence number of the first fragment.
    pub fn media_sequence(&self) -> u64 {
        self.media_sequence
    }

    /// Whether the playlist declared its end (`#EXT-X-ENDLIST`).
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Indices of the fragments carrying a program date-time, ascending.
    pub fn anchor_indices(&self) -> &[usize] {
        &self.anchors
    }

    /// Fragments carrying a program date-time.
    pub fn anchors(&self) -> impl Iterator<Item = &Fragment> + '_ {
        self.anchors.iter().map(move |&i| &self.fragments[i])
    }

    pub fn has_program_date_time(&self) -> bool {
        !self.anchors.is_empty()
    }

    /// Index of the last fragment with `start <= t`.
    ///
    /// A fragment starting exactly at `t` wins over one that merely ends there.
    pub fn index_at(&self, t: f64) -> Option<usize> {
        self.fragments
            .partition_point(|f| f.start <= t)
            .checked_sub(1)
    }

    /// Whether this timeline is `previous` with zero or more fragments
    /// appended.
    pub fn extends(&self, previous: &FragmentTimeline) -> bool {
        self.kind == previous.kind
            && previous.len() <= self.len()
            && previous
                .fragments
                .iter()
                .zip(&self.fragments)
                .all(|(old, new)| old.same_span(new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline(starts: &[f64]) -> FragmentTimeline {
        FragmentTimeline::new(
            PlaylistKind::Event,
            starts.iter().map(|&s| Fragment::new(s, 6.0)).collect(),
        )
    }

    #[test]
    fn test_fragment_new() {
        let f = Fragment::new(12.0, 6.0);
        assert_eq!(f.end, 18.0);
        assert!(f.contains(12.0));
        assert!(!f.contains(18.0));
    }

    #[test]
    fn test_new_sorts_and_drops_malformed() {
        let t = FragmentTimeline::new(
            PlaylistKind::Vod,
            vec![
                Fragment::new(12.0, 6.0),
                Fragment::new(f64::NAN, 6.0),
                Fragment::new(0.0, 6.0),
                Fragment::new(6.0, -1.0),
                Fragment::new(6.0, 6.0),
            ],
        );

        let starts: Vec<f64> = t.fragments().iter().map(|f| f.start).collect();
        assert_eq!(starts, vec![0.0, 6.0, 12.0]);
        assert_eq!(t.start(), Some(0.0));
        assert_eq!(t.end(), Some(18.0));
    }

    #[test]
    fn test_anchor_indices() {
        let t = FragmentTimeline::new(
            PlaylistKind::Event,
            vec![
                Fragment::new(0.0, 6.0),
                Fragment::new(6.0, 6.0).with_program_date_time(Some(7_000)),
                Fragment::new(12.0, 6.0),
                Fragment::new(18.0, 6.0).with_program_date_time(Some(19_000)),
            ],
        );

        assert_eq!(t.anchor_indices(), &[1, 3]);
        assert!(t.has_program_date_time());
        let pdts: Vec<_> = t.anchors().map(|f| f.program_date_time).collect();
        assert_eq!(pdts, vec![Some(7_000), Some(19_000)]);
    }

    #[test]
    fn test_index_at() {
        let t = timeline(&[0.0, 6.0, 12.0]);
        assert_eq!(t.index_at(-1.0), None);
        assert_eq!(t.index_at(0.0), Some(0));
        assert_eq!(t.index_at(5.99), Some(0));
        assert_eq!(t.index_at(6.0), Some(1));
        assert_eq!(t.index_at(100.0), Some(2));
    }

    #[test]
    fn test_extends() {
        let old = timeline(&[0.0, 6.0]);
        let grown = timeline(&[0.0, 6.0, 12.0]);
        let shifted = timeline(&[6.0, 12.0, 18.0]);

        assert!(grown.extends(&old));
        assert!(old.extends(&old));
        assert!(!shifted.extends(&old));
        assert!(!old.extends(&grown));
        assert!(grown.extends(&FragmentTimeline::new(PlaylistKind::Event, vec![])));
    }

    #[test]
    fn test_empty() {
        let t = FragmentTimeline::empty();
        assert!(t.is_empty());
        assert_eq!(t.kind(), PlaylistKind::Unknown);
        assert_eq!(t.end(), None);
        assert!(!t.has_program_date_time());
    }
}
