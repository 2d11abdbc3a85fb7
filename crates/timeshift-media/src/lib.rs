//! Timeshift-Media: fragment timelines, DVR windows and seek planning
//!
//! This crate is the synchronous core of timeshift. Everything in it is a
//! pure computation over an immutable [`FragmentTimeline`] snapshot, so a
//! session can take one snapshot per tick and derive every value from it
//! without locking.
//!
//! # Modules
//!
//! - `hls` - best-effort media playlist parsing and VOD playlist rendering
//! - `timeline` - fragments and the sorted fragment timeline
//! - `window` - DVR window resolution and played/buffered percentages
//! - `live_edge` - live position, signed delta and at-edge detection
//! - `datetime` - media time / program date-time mapping
//! - `seek` - seek planning with out-of-window confirmation and seek safety
//!
//! # Data flow
//!
//! ```text
//! playlist text / engine metadata
//!         -> FragmentTimeline
//!         -> { DvrWindowResolver, LiveEdgeTracker, DateTimeMapper }
//!         -> SeekPlanner
//!         -> target media time
//! ```
//!
//! # Example
//!
//! ```
//! use timeshift_common::BufferedRanges;
//! use timeshift_media::{hls, DvrWindowResolver, SeekPlanner};
//!
//! let timeline = hls::parse_media_playlist(
//!     "#EXTM3U\n#EXT-X-TARGETDURATION:6\n#EXTINF:6,\na.ts\n#EXTINF:6,\nb.ts\n",
//! );
//! let (window, _) = DvrWindowResolver::new().parsed_timeline(&timeline).resolve();
//! assert_eq!((window.start, window.end), (0.0, 12.0));
//!
//! let buffered = BufferedRanges::new();
//! let plan = SeekPlanner::new(&timeline, window, &buffered).plan_fraction(0.25);
//! assert_eq!(plan.target_media_time, 3.0);
//! ```

pub mod datetime;
pub mod error;
pub mod hls;
pub mod live_edge;
pub mod seek;
pub mod timeline;
pub mod window;

pub use datetime::{DateTimeBounds, DateTimeMapper, LabelZone, ProgramTimeFormat};
pub use error::{Error, Result};
pub use live_edge::{LiveEdgeState, LiveEdgeTracker};
pub use seek::{ConfirmOutOfWindow, OutOfWindow, SeekPlan, SeekPlanner, SeekRequest};
pub use timeline::{EpochMillis, Fragment, FragmentTimeline};
pub use window::{DvrWindow, DvrWindowResolver, WindowSource};
