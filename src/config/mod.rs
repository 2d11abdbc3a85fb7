mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use timeshift_media::{LiveEdgeTracker, ProgramTimeFormat};

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./timeshift.toml", "~/.config/timeshift/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.session.poll_interval_ms == 0 {
        anyhow::bail!("session.poll_interval_ms cannot be 0");
    }
    if config.session.sample_interval_ms == 0 {
        anyhow::bail!("session.sample_interval_ms cannot be 0");
    }
    let margin = config.session.seek_safety_margin_secs;
    if !margin.is_finite() || margin < 0.0 {
        anyhow::bail!("session.seek_safety_margin_secs must be a non-negative number");
    }

    let thresholds = [
        ("live_edge.at_edge_threshold_secs", config.live_edge.at_edge_threshold_secs),
        (
            "live_edge.return_to_live_threshold_secs",
            config.live_edge.return_to_live_threshold_secs,
        ),
    ];
    for (name, value) in thresholds {
        if !value.is_finite() || value <= 0.0 {
            anyhow::bail!("{} must be a positive number", name);
        }
    }

    if config.fetch.timeout_secs == 0 {
        anyhow::bail!("fetch.timeout_secs cannot be 0");
    }
    if config.display.label_format.trim().is_empty() {
        anyhow::bail!("display.label_format cannot be empty");
    }
    if !ProgramTimeFormat::is_valid_pattern(&config.display.label_format) {
        anyhow::bail!(
            "display.label_format is not a valid strftime pattern: {:?}",
            config.display.label_format
        );
    }

    Ok(())
}

impl SessionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}

impl LiveEdgeConfig {
    pub fn tracker(&self) -> LiveEdgeTracker {
        LiveEdgeTracker::new(
            self.at_edge_threshold_secs,
            self.return_to_live_threshold_secs,
        )
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl DisplayConfig {
    pub fn program_time_format(&self) -> ProgramTimeFormat {
        ProgramTimeFormat::new(self.label_format.clone(), self.time_zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.session.poll_interval(), Duration::from_millis(4000));
        assert_eq!(config.session.sample_interval(), Duration::from_millis(16));
        assert_eq!(config.session.seek_safety_margin_secs, 0.25);
        assert_eq!(config.live_edge.at_edge_threshold_secs, 0.75);
        assert_eq!(config.live_edge.return_to_live_threshold_secs, 10.0);
        assert_eq!(config.fetch.timeout(), Duration::from_secs(10));
        assert!(config.fetch.user_agent.starts_with("timeshift/"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [session]
            poll_interval_ms = 2000

            [display]
            time_zone = "local"
            "#,
        )
        .unwrap();

        assert_eq!(config.session.poll_interval_ms, 2000);
        assert_eq!(config.session.sample_interval_ms, 16);
        assert_eq!(config.display.time_zone, timeshift_media::LabelZone::Local);
        assert_eq!(config.display.label_format, "%Y-%m-%d %H:%M:%S");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.session.poll_interval_ms = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.session.seek_safety_margin_secs = -0.1;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.live_edge.at_edge_threshold_secs = 0.0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.live_edge.return_to_live_threshold_secs = f64::NAN;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.fetch.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_strftime_specifier() {
        let mut config = Config::default();
        config.display.label_format = "%Q".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("display.label_format"));

        config.display.label_format = "%H:%M:%S".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_tracker_uses_configured_thresholds() {
        let mut config = Config::default();
        config.live_edge.at_edge_threshold_secs = 2.0;
        assert_eq!(config.live_edge.tracker().at_edge_threshold(), 2.0);
    }
}
