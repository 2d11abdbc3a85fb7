use serde::{Deserialize, Serialize};
use timeshift_media::LabelZone;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub live_edge: LiveEdgeConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Delay between manual playlist refreshes, measured from the end of the
    /// previous fetch (default: 4000)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Playback sampling cadence (default: 16, about one display refresh)
    #[serde(default = "default_sample_interval")]
    pub sample_interval_ms: u64,

    /// Distance kept from the end of a buffered range when a timestamp seek
    /// lands inside it (default: 0.25)
    #[serde(default = "default_seek_safety_margin")]
    pub seek_safety_margin_secs: f64,
}

fn default_poll_interval() -> u64 {
    4000
}
fn default_sample_interval() -> u64 {
    16
}
fn default_seek_safety_margin() -> f64 {
    timeshift_media::seek::SEEK_SAFETY_MARGIN_SECS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            sample_interval_ms: default_sample_interval(),
            seek_safety_margin_secs: default_seek_safety_margin(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LiveEdgeConfig {
    /// Playback closer than this to the live position counts as live
    #[serde(default = "default_at_edge_threshold")]
    pub at_edge_threshold_secs: f64,

    /// Lag beyond which "return to live" is offered
    #[serde(default = "default_return_to_live_threshold")]
    pub return_to_live_threshold_secs: f64,
}

fn default_at_edge_threshold() -> f64 {
    timeshift_media::live_edge::AT_EDGE_THRESHOLD_SECS
}
fn default_return_to_live_threshold() -> f64 {
    timeshift_media::live_edge::RETURN_TO_LIVE_THRESHOLD_SECS
}

impl Default for LiveEdgeConfig {
    fn default() -> Self {
        Self {
            at_edge_threshold_secs: default_at_edge_threshold(),
            return_to_live_threshold_secs: default_return_to_live_threshold(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    /// Request timeout for playlist fetches (default: 10)
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_fetch_timeout() -> u64 {
    10
}
fn default_user_agent() -> String {
    format!("timeshift/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// chrono strftime pattern for the program-time label
    #[serde(default = "default_label_format")]
    pub label_format: String,

    /// Zone the label is rendered in: "utc" or "local"
    #[serde(default)]
    pub time_zone: LabelZone,
}

fn default_label_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            label_format: default_label_format(),
            time_zone: LabelZone::default(),
        }
    }
}
