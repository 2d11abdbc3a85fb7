//! Copy-on-write timeline snapshot.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use timeshift_media::FragmentTimeline;

/// Holds the session's current fragment timeline.
///
/// There is a single writer (the active provider task). Readers take an
/// `Arc` snapshot and never observe a timeline mid-replacement.
#[derive(Debug, Default)]
pub struct TimelineStore {
    current: RwLock<Arc<FragmentTimeline>>,
    generation: AtomicU64,
}

impl TimelineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current timeline snapshot.
    pub fn snapshot(&self) -> Arc<FragmentTimeline> {
        self.current.read().clone()
    }

    /// Number of replacements so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Replace the timeline wholesale and return the new generation.
    pub fn replace(&self, timeline: FragmentTimeline) -> u64 {
        let timeline = Arc::new(timeline);
        let previous = std::mem::replace(&mut *self.current.write(), timeline.clone());
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        if timeline.extends(&previous) {
            tracing::debug!(
                generation,
                fragments = timeline.len(),
                appended = timeline.len() - previous.len(),
                "Timeline refreshed"
            );
        } else {
            tracing::info!(
                generation,
                fragments = timeline.len(),
                kind = %timeline.kind(),
                previous_fragments = previous.len(),
                "Timeline replaced"
            );
        }
        generation
    }
}
