//! Best-effort media playlist parser.
//!
//! Scans playlist text line by line and emits one [`Fragment`] per content
//! line. It never fails: malformed tags are skipped and logged, and the worst
//! case is an empty or partially tagged timeline.
//!
//! [`check_media_playlist`] is the gate in front of it for fetched text: it
//! requires the `#EXTM3U` header and uses `m3u8_rs` to turn away multivariant
//! playlists, whose variant URIs would otherwise be read as fragments.

use m3u8_rs::Playlist;
use timeshift_common::PlaylistKind;

use crate::datetime::parse_timestamp;
use crate::timeline::{EpochMillis, Fragment, FragmentTimeline};

const TAG_TARGET_DURATION: &str = "#EXT-X-TARGETDURATION:";
const TAG_MEDIA_SEQUENCE: &str = "#EXT-X-MEDIA-SEQUENCE:";
const TAG_PLAYLIST_TYPE: &str = "#EXT-X-PLAYLIST-TYPE:";
const TAG_PROGRAM_DATE_TIME: &str = "#EXT-X-PROGRAM-DATE-TIME:";
const TAG_INF: &str = "#EXTINF:";
const TAG_DISCONTINUITY: &str = "#EXT-X-DISCONTINUITY";
const TAG_ENDLIST: &str = "#EXT-X-ENDLIST";
const HEADER: &str = "#EXTM3U";

/// Why fetched text cannot be used as a media playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlaylistRejection {
    #[error("response is not an M3U8 playlist")]
    MissingHeader,
    #[error("multivariant playlist, expected a media playlist")]
    Multivariant,
}

/// Check that `text` is a media playlist before handing it to
/// [`parse_media_playlist`].
pub fn check_media_playlist(text: &str) -> Result<(), PlaylistRejection> {
    let body = text.trim_start_matches('\u{feff}').trim_start();
    if !body.starts_with(HEADER) {
        return Err(PlaylistRejection::MissingHeader);
    }
    // Media text the crate cannot parse is left to the tolerant scan.
    match m3u8_rs::parse_playlist(body.as_bytes()) {
        Ok((_, Playlist::MasterPlaylist(_))) => Err(PlaylistRejection::Multivariant),
        _ => Ok(()),
    }
}

/// Running state of the line scan.
#[derive(Debug, Default)]
struct ScanState {
    kind: PlaylistKind,
    target_duration: Option<f64>,
    media_sequence: u64,
    pending_duration: Option<f64>,
    pending_pdt: Option<EpochMillis>,
    pending_discontinuity: bool,
    ended: bool,
    fragments: Vec<Fragment>,
}

impl ScanState {
    fn tag(&mut self, line: &str, line_no: usize) {
        if let Some(value) = line.strip_prefix(TAG_INF) {
            // "#EXTINF:<duration>,[<title>]"
            let duration = value.split(',').next().unwrap_or_default();
            match parse_duration(duration) {
                Some(d) => self.pending_duration = Some(d),
                None => skipped(line_no, line),
            }
        } else if let Some(value) = line.strip_prefix(TAG_PROGRAM_DATE_TIME) {
            self.pending_pdt = parse_timestamp(value);
            if self.pending_pdt.is_none() {
                skipped(line_no, line);
            }
        } else if let Some(value) = line.strip_prefix(TAG_TARGET_DURATION) {
            match parse_duration(value) {
                Some(d) => self.target_duration = Some(d),
                None => skipped(line_no, line),
            }
        } else if let Some(value) = line.strip_prefix(TAG_MEDIA_SEQUENCE) {
            match value.trim().parse::<u64>() {
                Ok(seq) => self.media_sequence = seq,
                Err(_) => skipped(line_no, line),
            }
        } else if let Some(value) = line.strip_prefix(TAG_PLAYLIST_TYPE) {
            self.kind = PlaylistKind::from_tag_value(value);
        } else if line.starts_with(TAG_DISCONTINUITY)
            && !line.starts_with("#EXT-X-DISCONTINUITY-SEQUENCE")
        {
            self.pending_discontinuity = true;
        } else if line.starts_with(TAG_ENDLIST) {
            self.ended = true;
        }
        // Anything else (comments, unknown tags) passes through silently.
    }

    fn segment(&mut self, uri: &str) {
        let start = self.fragments.last().map_or(0.0, |f| f.end);
        let duration = self
            .pending_duration
            .take()
            .or(self.target_duration)
            .unwrap_or(0.0);
        let sequence = self.media_sequence + self.fragments.len() as u64;

        let fragment = Fragment::new(start, duration)
            .with_program_date_time(self.pending_pdt.take())
            .with_sequence(sequence)
            .with_uri(uri)
            .with_discontinuity(std::mem::take(&mut self.pending_discontinuity));
        self.fragments.push(fragment);
    }

    fn finish(self) -> FragmentTimeline {
        FragmentTimeline::new(self.kind, self.fragments)
            .with_target_duration(self.target_duration)
            .with_media_sequence(self.media_sequence)
            .with_ended(self.ended)
    }
}

fn parse_duration(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
}

fn skipped(line_no: usize, line: &str) {
    tracing::warn!(line = line_no, tag = %line, "Skipping malformed playlist tag");
}

/// Parse media playlist text into a fragment timeline.
///
/// Each content line starts where the previous fragment ended (or at 0) and
/// lasts for the pending `#EXTINF` duration, falling back to the last-seen
/// target duration. A program date-time applies to the next fragment only.
pub fn parse_media_playlist(text: &str) -> FragmentTimeline {
    let mut state = ScanState::default();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('#') {
            state.tag(line, idx + 1);
        } else {
            state.segment(line);
        }
    }

    let timeline = state.finish();
    tracing::trace!(
        fragments = timeline.len(),
        kind = %timeline.kind(),
        anchored = timeline.anchor_indices().len(),
        "Parsed media playlist"
    );
    timeline
}

/// URIs of every segment in the playlist, in order.
pub fn segment_uris(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}
