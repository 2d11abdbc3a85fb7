//! Benchmark one sampling tick of the playback view.
//!
//! The sampler recomputes the whole view roughly every display frame, so
//! this measures window resolution, live edge tracking and program-time
//! mapping over a four-hour EVENT recording.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::fmt::Write;
use timeshift::engine::SourceCapability;
use timeshift::player::PlayerSample;
use timeshift::session::{compute_view, ViewInputs};
use timeshift_common::{BufferedRanges, TimeRange};
use timeshift_media::{hls, LiveEdgeTracker, ProgramTimeFormat};

fn fixture_playlist() -> String {
    let mut text = String::from("#EXTM3U\n#EXT-X-TARGETDURATION:2\n#EXT-X-PLAYLIST-TYPE:EVENT\n");
    for i in 0..7_200u64 {
        let secs = i * 2;
        if i % 10 == 0 {
            let _ = writeln!(
                text,
                "#EXT-X-PROGRAM-DATE-TIME:2024-01-01T{:02}:{:02}:{:02}.000Z",
                secs / 3600,
                (secs / 60) % 60,
                secs % 60
            );
        }
        let _ = writeln!(text, "#EXTINF:2.000,\nseg{i}.ts");
    }
    text
}

fn bench_session_view(c: &mut Criterion) {
    let timeline = hls::parse_media_playlist(&fixture_playlist());
    let tracker = LiveEdgeTracker::default();
    let label_format = ProgramTimeFormat::default();
    let sample = PlayerSample {
        current_time: 9_000.0,
        buffered: BufferedRanges::from(vec![TimeRange::new(8_990.0, 9_030.0)]),
    };

    let mut group = c.benchmark_group("session_view");

    group.bench_function("compute_view", |b| {
        b.iter(|| {
            compute_view(black_box(&ViewInputs {
                timeline: &timeline,
                capability: SourceCapability::PlaylistOnly,
                live_sync_position: None,
                total_duration: None,
                sample: &sample,
                tracker: &tracker,
                label_format: &label_format,
            }))
        });
    });

    group.bench_function("compute_view_at_live_edge", |b| {
        let at_edge = PlayerSample {
            current_time: 14_399.5,
            buffered: BufferedRanges::from(vec![TimeRange::new(14_380.0, 14_400.0)]),
        };
        b.iter(|| {
            compute_view(black_box(&ViewInputs {
                timeline: &timeline,
                capability: SourceCapability::NativeMetadata,
                live_sync_position: Some(14_400.0),
                total_duration: Some(14_400.0),
                sample: &at_edge,
                tracker: &tracker,
                label_format: &label_format,
            }))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_session_view);
criterion_main!(benches);
