mod cli;

use timeshift::{
    config,
    engine::{poll_once, SourceCapability, TimelineSource},
    fetch,
    player::SimulatedPlayer,
    session::{resolve_window, Session, SessionOptions},
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use timeshift_common::{BufferedRanges, TimeRange};
use timeshift_media::{
    datetime::format_rfc3339, hls::VodPlaylist, DateTimeBounds, DateTimeMapper, DvrWindow,
    FragmentTimeline, OutOfWindow, SeekPlanner, SeekRequest, WindowSource,
};

/// Buffer the simulated player keeps ahead of the playhead.
const FOLLOW_BUFFER_AHEAD_SECS: f64 = 30.0;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "timeshift=trace,timeshift_media=trace,timeshift_common=debug".to_string()
        } else {
            "timeshift=info,timeshift_media=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Inspect {
            source,
            json,
            export_vod,
        } => inspect(&source, cli.config.as_deref(), json, export_vod.as_deref()),
        Commands::Resolve {
            source,
            at,
            fraction,
            snap,
            buffered,
        } => {
            let request = match (at, fraction) {
                (Some(at), _) => SeekRequest::Timestamp(at),
                (None, Some(fraction)) => SeekRequest::Fraction(fraction),
                (None, None) => anyhow::bail!("Either --at or --fraction is required"),
            };
            resolve(&source, cli.config.as_deref(), request, snap, &buffered)
        }
        Commands::Follow {
            source,
            behind,
            duration,
            json,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(follow(
                &source,
                cli.config.as_deref(),
                behind,
                duration.map(Duration::from_secs),
                json,
            ))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("timeshift {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn load_timeline(source: &str, config: &config::Config) -> Result<FragmentTimeline> {
    let fetcher = fetch::fetcher_for(source, &config.fetch)?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(poll_once(fetcher.as_ref()))
        .with_context(|| format!("Failed to load playlist: {}", source))
}

fn label(ms: i64) -> String {
    format_rfc3339(ms).unwrap_or_else(|| ms.to_string())
}

#[derive(Serialize)]
struct InspectReport<'a> {
    source: &'a str,
    window: DvrWindow,
    window_source: WindowSource,
    date_time_bounds: Option<DateTimeBounds>,
    timeline: &'a FragmentTimeline,
}

fn inspect(
    source: &str,
    config_path: Option<&Path>,
    json: bool,
    export_vod: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let timeline = load_timeline(source, &config)?;

    let (window, window_source) = resolve_window(
        &timeline,
        SourceCapability::PlaylistOnly,
        None,
        &BufferedRanges::new(),
        None,
    );
    let bounds = DateTimeMapper::new(&timeline).bounds();

    if json {
        let report = InspectReport {
            source,
            window,
            window_source,
            date_time_bounds: bounds,
            timeline: &timeline,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Source: {}", source);
        println!("Type: {}", timeline.kind());
        println!(
            "Fragments: {} (media sequence {})",
            timeline.len(),
            timeline.media_sequence()
        );
        if let Some(target) = timeline.target_duration() {
            println!("Target duration: {}s", target);
        }
        println!("Ended: {}", if timeline.is_ended() { "yes" } else { "no" });
        println!(
            "Window: {:.3}s - {:.3}s ({:.3}s, from {:?})",
            window.start,
            window.end,
            window.length(),
            window_source
        );
        match bounds {
            Some(bounds) => {
                println!("Program time: {} - {}", label(bounds.min), label(bounds.max));
                println!(
                    "  Anchored fragments: {}/{}",
                    timeline.anchor_indices().len(),
                    timeline.len()
                );
            }
            None => println!("Program time: unavailable"),
        }
    }

    if let Some(path) = export_vod {
        let m3u8 = VodPlaylist::default().render(&timeline);
        std::fs::write(path, m3u8)
            .with_context(|| format!("Failed to write VOD playlist: {:?}", path))?;
        if !json {
            println!("\nWrote VOD playlist to {}", path.display());
        }
    }

    Ok(())
}

fn parse_buffered(ranges: &[String]) -> Result<BufferedRanges> {
    ranges
        .iter()
        .map(|range| {
            let (start, end) = range
                .split_once(':')
                .with_context(|| format!("Buffered range must be START:END, got {:?}", range))?;
            let start: f64 = start
                .trim()
                .parse()
                .with_context(|| format!("Invalid buffered range start: {:?}", range))?;
            let end: f64 = end
                .trim()
                .parse()
                .with_context(|| format!("Invalid buffered range end: {:?}", range))?;
            if !(start.is_finite() && end.is_finite()) || start > end {
                anyhow::bail!("Invalid buffered range: {:?}", range);
            }
            Ok(TimeRange::new(start, end))
        })
        .collect::<Result<Vec<_>>>()
        .map(BufferedRanges::from)
}

/// Ask on stdin whether to snap an out-of-window timestamp.
fn prompt_snap(condition: &OutOfWindow) -> bool {
    eprint!(
        "{} is outside the recording ({} - {}). Jump to {} instead? [y/N] ",
        label(condition.requested),
        label(condition.bounds.min),
        label(condition.bounds.max),
        label(condition.nearest)
    );
    let _ = std::io::stderr().flush();

    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

fn resolve(
    source: &str,
    config_path: Option<&Path>,
    request: SeekRequest,
    snap: bool,
    buffered: &[String],
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let buffered = parse_buffered(buffered)?;
    let timeline = load_timeline(source, &config)?;

    let (window, _) = resolve_window(
        &timeline,
        SourceCapability::PlaylistOnly,
        None,
        &buffered,
        None,
    );
    let planner = SeekPlanner::new(&timeline, window, &buffered)
        .with_safety_margin(config.session.seek_safety_margin_secs);

    let plan = if snap {
        planner.plan(&request, &mut |_: &OutOfWindow| true)?
    } else {
        planner.plan(&request, &mut prompt_snap)?
    };

    println!("Target media time: {:.3}s", plan.target_media_time);
    if let Some(pdt) = DateTimeMapper::new(&timeline).media_time_to_pdt(plan.target_media_time) {
        println!("Program time: {}", label(pdt));
    }
    if plan.was_clamped {
        println!("Request was clamped into range");
    }
    if plan.out_of_window {
        println!("Snapped to nearest recording bound");
    }
    if plan.safety_adjusted {
        println!(
            "Moved {:.2}s back from buffered edge",
            config.session.seek_safety_margin_secs
        );
    }

    Ok(())
}

async fn follow(
    source: &str,
    config_path: Option<&Path>,
    behind: f64,
    duration: Option<Duration>,
    json: bool,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let fetcher = fetch::fetcher_for(source, &config.fetch)?;

    let initial = poll_once(fetcher.as_ref())
        .await
        .with_context(|| format!("Failed to load playlist: {}", source))?;
    let start = initial.start().unwrap_or(0.0);
    let edge = initial.end().unwrap_or(start);
    let position = (edge - behind.max(0.0)).max(start);

    let player = Arc::new(SimulatedPlayer::new(position, FOLLOW_BUFFER_AHEAD_SECS));
    player.set_live_edge(Some(edge));

    let session = Session::start(
        TimelineSource::Playlist { fetcher },
        player.clone(),
        SessionOptions::from_config(&config),
    );

    let deadline = async {
        match duration {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);
    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = &mut interrupted => break,
            _ = &mut deadline => break,
            _ = ticker.tick() => {
                let view = session.view();
                if view.fragments > 0 {
                    player.set_live_edge(Some(view.window.end));
                }

                if json {
                    println!("{}", serde_json::to_string(&view)?);
                } else {
                    println!(
                        "{:>8} {:>10.3}s  window {:.1}-{:.1}s  played {:>5.1}%  buffered {:>5.1}%  {}",
                        view.live_label.as_deref().unwrap_or("VOD"),
                        view.current_time,
                        view.window.start,
                        view.window.end,
                        view.played_pct,
                        view.buffered_pct,
                        view.program_time_label.as_deref().unwrap_or("-"),
                    );
                }
            }
        }
    }

    session.shutdown().await;
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Poll interval: {}ms", config.session.poll_interval_ms);
            println!("  Sample interval: {}ms", config.session.sample_interval_ms);
            println!(
                "  Seek safety margin: {}s",
                config.session.seek_safety_margin_secs
            );
            println!(
                "  Live edge: at-edge < {}s, return-to-live > {}s",
                config.live_edge.at_edge_threshold_secs,
                config.live_edge.return_to_live_threshold_secs
            );
            println!("  Fetch timeout: {}s", config.fetch.timeout_secs);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Poll interval: {}ms", config.session.poll_interval_ms);
            println!("  Sample interval: {}ms", config.session.sample_interval_ms);
        }
    }

    Ok(())
}
