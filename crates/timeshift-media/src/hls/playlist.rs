//! VOD playlist rendering.
//!
//! Turns a fragment timeline back into M3U8 text, declaring it a finished
//! on-demand recording: `PLAYLIST-TYPE:VOD`, program date-times preserved,
//! segment URIs reduced to their basenames and a terminating
//! `#EXT-X-ENDLIST`.

use std::fmt::Write;

use crate::datetime::format_rfc3339;
use crate::timeline::FragmentTimeline;

/// Options for rendering a timeline as a VOD playlist.
#[derive(Debug, Clone)]
pub struct VodPlaylist {
    /// Protocol version written to `#EXT-X-VERSION`.
    pub version: u32,
    /// Strip directories from segment URIs.
    pub basename_uris: bool,
}

impl Default for VodPlaylist {
    fn default() -> Self {
        Self {
            version: 3,
            basename_uris: true,
        }
    }
}

impl VodPlaylist {
    /// Render to M3U8 string.
    ///
    /// Fragments without a URI (engine-provided metadata) are named
    /// `segment<sequence>.ts`.
    pub fn render(&self, timeline: &FragmentTimeline) -> String {
        let mut out = String::new();

        let target_duration = timeline
            .fragments()
            .iter()
            .map(|f| f.duration)
            .fold(timeline.target_duration().unwrap_or(0.0), f64::max)
            .ceil() as u64;

        let _ = writeln!(out, "#EXTM3U");
        let _ = writeln!(out, "#EXT-X-VERSION:{}", self.version);
        let _ = writeln!(out, "#EXT-X-TARGETDURATION:{}", target_duration);
        let _ = writeln!(out, "#EXT-X-MEDIA-SEQUENCE:{}", timeline.media_sequence());
        let _ = writeln!(out, "#EXT-X-PLAYLIST-TYPE:VOD");

        for (i, fragment) in timeline.fragments().iter().enumerate() {
            if fragment.discontinuity {
                let _ = writeln!(out, "#EXT-X-DISCONTINUITY");
            }
            let _ = writeln!(out, "#EXTINF:{:.6},", fragment.duration);
            if let Some(pdt) = fragment.program_date_time.and_then(format_rfc3339) {
                let _ = writeln!(out, "#EXT-X-PROGRAM-DATE-TIME:{}", pdt);
            }
            let sequence = fragment
                .sequence
                .unwrap_or(timeline.media_sequence() + i as u64);
            let uri = match fragment.uri.as_deref() {
                Some(uri) if self.basename_uris => basename(uri).to_string(),
                Some(uri) => uri.to_string(),
                None => format!("segment{}.ts", sequence),
            };
            let _ = writeln!(out, "{}", uri);
        }

        let _ = writeln!(out, "#EXT-X-ENDLIST");
        out
    }
}

/// Last path component of a segment URI, ignoring any query string.
fn basename(uri: &str) -> &str {
    let path = uri.split(['?', '#']).next().unwrap_or(uri);
    path.rsplit('/').find(|s| !s.is_empty()).unwrap_or(path)
}
