//! HLS media playlists.
//!
//! Parsing playlist text into a fragment timeline, and rendering a timeline
//! back out as a finished VOD playlist.

mod parser;
mod playlist;

pub use parser::{check_media_playlist, parse_media_playlist, segment_uris, PlaylistRejection};
pub use playlist::VodPlaylist;
