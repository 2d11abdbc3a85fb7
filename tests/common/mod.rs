//! Shared test doubles for integration tests.
//!
//! Provides a scripted [`PlaylistFetcher`] that records call concurrency, a
//! controllable [`PlayerHandle`] and an [`EngineControl`] that counts the
//! commands it receives.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use timeshift::engine::EngineControl;
use timeshift::fetch::PlaylistFetcher;
use timeshift::player::{PlayerHandle, PlayerSample};
use timeshift_common::{BufferedRanges, Error, Result, TimeRange};

/// Media playlist text with `count` six-second segments, each carrying a
/// program date-time starting at 2024-01-01T00:00:00Z.
pub fn event_playlist(count: usize) -> String {
    let mut text = String::from(
        "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-TARGETDURATION:6\n#EXT-X-PLAYLIST-TYPE:EVENT\n",
    );
    for i in 0..count {
        let secs = i * 6;
        writeln!(
            text,
            "#EXTINF:6.000000,\n#EXT-X-PROGRAM-DATE-TIME:2024-01-01T00:{:02}:{:02}.000Z\nseg{}.ts",
            secs / 60,
            secs % 60,
            i
        )
        .unwrap();
    }
    text
}

/// Fetcher that replays a script of responses. `None` entries fail. Once the
/// script runs out, the last entry repeats.
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<Option<String>>>,
    last: Mutex<Option<String>>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new(script: Vec<Option<String>>, delay: Duration) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            delay,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Option<String> {
        let mut script = self.script.lock();
        let mut last = self.last.lock();
        if let Some(entry) = script.pop_front() {
            *last = entry;
        }
        last.clone()
    }
}

#[async_trait::async_trait]
impl PlaylistFetcher for ScriptedFetcher {
    async fn fetch(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;
        let response = self.next_response();

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response.ok_or_else(|| Error::fetch("scripted failure"))
    }

    fn source(&self) -> &str {
        "scripted"
    }
}

/// Player whose position, buffer and availability are set by the test.
pub struct TestPlayer {
    available: AtomicBool,
    sample: Mutex<PlayerSample>,
    seeks: Mutex<Vec<f64>>,
}

impl TestPlayer {
    pub fn new(current_time: f64, buffered: &[(f64, f64)]) -> Self {
        Self {
            available: AtomicBool::new(true),
            sample: Mutex::new(PlayerSample {
                current_time,
                buffered: buffered
                    .iter()
                    .map(|&(start, end)| TimeRange::new(start, end))
                    .collect::<BufferedRanges>(),
            }),
            seeks: Mutex::new(Vec::new()),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn set_current_time(&self, t: f64) {
        self.sample.lock().current_time = t;
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.seeks.lock().clone()
    }
}

impl PlayerHandle for TestPlayer {
    fn sample(&self) -> Option<PlayerSample> {
        if !self.available.load(Ordering::SeqCst) {
            return None;
        }
        Some(self.sample.lock().clone())
    }

    fn seek(&self, media_time: f64) -> Result<()> {
        self.seeks.lock().push(media_time);
        self.sample.lock().current_time = media_time;
        Ok(())
    }
}

/// Engine control that counts each command.
#[derive(Default)]
pub struct CountingControl {
    pub retries: AtomicUsize,
    pub recoveries: AtomicUsize,
    pub reinitializations: AtomicUsize,
}

#[async_trait::async_trait]
impl EngineControl for CountingControl {
    async fn retry_load(&self) -> Result<()> {
        self.retries.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn recover_media(&self) -> Result<()> {
        self.recoveries.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn reinitialize(&self) -> Result<()> {
        self.reinitializations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
