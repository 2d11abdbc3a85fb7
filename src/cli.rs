use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "timeshift")]
#[command(author, version, about = "Live/DVR timeline tool for growing HLS recordings")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a playlist and show its timeline, DVR window and date-time bounds
    Inspect {
        /// Playlist file path or http(s) URL
        #[arg(required = true)]
        source: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Write a finalized VOD rendition of the playlist to this path
        #[arg(long)]
        export_vod: Option<PathBuf>,
    },

    /// Plan a seek and print the target media time
    Resolve {
        /// Playlist file path or http(s) URL
        #[arg(required = true)]
        source: String,

        /// Absolute timestamp to seek to (ISO-8601)
        #[arg(long, conflicts_with = "fraction", required_unless_present = "fraction")]
        at: Option<String>,

        /// Position within the DVR window, 0.0 to 1.0
        #[arg(long)]
        fraction: Option<f64>,

        /// Snap out-of-window timestamps to the nearest bound without asking
        #[arg(long)]
        snap: bool,

        /// Buffered range as START:END seconds (repeatable)
        #[arg(long, value_name = "START:END")]
        buffered: Vec<String>,
    },

    /// Follow a live recording and print the playback view every second
    Follow {
        /// Playlist file path or http(s) URL
        #[arg(required = true)]
        source: String,

        /// Start this many seconds behind the live edge
        #[arg(long, default_value = "0")]
        behind: f64,

        /// Stop after this many seconds (runs until Ctrl-C if omitted)
        #[arg(long)]
        duration: Option<u64>,

        /// Output one JSON object per line
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
