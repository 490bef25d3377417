//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.ecfr-wordcount.toml` files.

use crate::cli::{Args, RunMode};
use crate::document::CountingStrategy;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the current directory.
pub const CONFIG_FILE: &str = ".ecfr-wordcount.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// eCFR API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Artifact locations.
    #[serde(default)]
    pub output: OutputConfig,

    /// Historical run settings.
    #[serde(default)]
    pub historical: HistoricalConfig,

    /// Attribution strategy per run mode.
    #[serde(default)]
    pub counting: CountingConfig,
}

/// eCFR API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the eCFR service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.ecfr.gov".to_string()
}

fn default_timeout() -> u64 {
    120 // full-title XML for the largest titles runs to hundreds of MB
}

fn default_user_agent() -> String {
    format!("ecfr-wordcount/{}", env!("CARGO_PKG_VERSION"))
}

/// Artifact locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    #[serde(default = "default_historical_path")]
    pub historical_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            historical_path: default_historical_path(),
        }
    }
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from(crate::report::SNAPSHOT_FILE)
}

fn default_historical_path() -> PathBuf {
    PathBuf::from(crate::report::HISTORICAL_FILE)
}

/// Historical run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalConfig {
    /// Most recent issue dates processed per title.
    #[serde(default = "default_max_dates")]
    pub max_dates: usize,

    /// Pause after each document fetch, in milliseconds.
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
}

impl Default for HistoricalConfig {
    fn default() -> Self {
        Self {
            max_dates: default_max_dates(),
            pause_ms: default_pause_ms(),
        }
    }
}

fn default_max_dates() -> usize {
    crate::catalog::DEFAULT_HISTORY_DEPTH
}

fn default_pause_ms() -> u64 {
    500
}

/// Attribution strategy per run mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountingConfig {
    #[serde(default = "default_snapshot_strategy")]
    pub snapshot_strategy: CountingStrategy,

    #[serde(default = "default_historical_strategy")]
    pub historical_strategy: CountingStrategy,
}

impl Default for CountingConfig {
    fn default() -> Self {
        Self {
            snapshot_strategy: default_snapshot_strategy(),
            historical_strategy: default_historical_strategy(),
        }
    }
}

fn default_snapshot_strategy() -> CountingStrategy {
    CountingStrategy::AncestorWalk
}

fn default_historical_strategy() -> CountingStrategy {
    CountingStrategy::ContainerScoped
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values given explicitly on the command line (or through their
    /// environment variables) override the file.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref base_url) = args.base_url {
            self.api.base_url = base_url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = timeout;
        }

        if let Some(max_dates) = args.max_dates {
            self.historical.max_dates = max_dates;
        }
        if let Some(pause_ms) = args.pause_ms {
            self.historical.pause_ms = pause_ms;
        }

        // --strategy and --output apply to the selected mode only
        if let Some(strategy) = args.strategy {
            match args.mode {
                RunMode::Snapshot => self.counting.snapshot_strategy = strategy,
                RunMode::Historical => self.counting.historical_strategy = strategy,
            }
        }
        if let Some(ref output) = args.output {
            match args.mode {
                RunMode::Snapshot => self.output.snapshot_path = output.clone(),
                RunMode::Historical => self.output.historical_path = output.clone(),
            }
        }
    }

    /// Check the merged values against the same minimums as the CLI flags.
    pub fn validate(&self) -> Result<()> {
        let base_url = &self.api.base_url;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            bail!("api.base_url must start with 'http://' or 'https://'");
        }
        if self.api.timeout_seconds == 0 {
            bail!("api.timeout_seconds must be at least 1");
        }
        if self.historical.max_dates == 0 {
            bail!("historical.max_dates must be at least 1");
        }
        Ok(())
    }

    /// Attribution strategy for a run mode.
    pub fn strategy_for(&self, mode: RunMode) -> CountingStrategy {
        match mode {
            RunMode::Snapshot => self.counting.snapshot_strategy,
            RunMode::Historical => self.counting.historical_strategy,
        }
    }

    /// Artifact path for a run mode.
    pub fn output_for(&self, mode: RunMode) -> &Path {
        match mode {
            RunMode::Snapshot => &self.output.snapshot_path,
            RunMode::Historical => &self.output.historical_path,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tests::make_args;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://www.ecfr.gov");
        assert_eq!(config.historical.max_dates, 3);
        assert_eq!(config.historical.pause_ms, 500);
        assert_eq!(config.strategy_for(RunMode::Snapshot), CountingStrategy::AncestorWalk);
        assert_eq!(
            config.strategy_for(RunMode::Historical),
            CountingStrategy::ContainerScoped
        );
        assert_eq!(config.output_for(RunMode::Snapshot), Path::new("word_counts.json"));
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[api]
base_url = "http://localhost:8080"
timeout_seconds = 30

[output]
historical_path = "out/history.json"

[historical]
max_dates = 5

[counting]
snapshot_strategy = "container-scoped"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.timeout_seconds, 30);
        assert!(config.api.user_agent.starts_with("ecfr-wordcount/"));
        assert_eq!(config.output.historical_path, PathBuf::from("out/history.json"));
        assert_eq!(config.output.snapshot_path, PathBuf::from("word_counts.json"));
        assert_eq!(config.historical.max_dates, 5);
        assert_eq!(config.historical.pause_ms, 500);
        assert_eq!(
            config.counting.snapshot_strategy,
            CountingStrategy::ContainerScoped
        );
    }

    #[test]
    fn test_merge_only_overrides_explicit_args() {
        let mut config: Config = toml::from_str("[historical]\nmax_dates = 5\npause_ms = 0\n").unwrap();

        let mut args = make_args();
        args.mode = RunMode::Historical;
        args.strategy = Some(CountingStrategy::AncestorWalk);
        args.output = Some(PathBuf::from("trend.json"));
        args.pause_ms = Some(250);
        config.merge_with_args(&args);

        assert_eq!(config.historical.max_dates, 5);
        assert_eq!(config.historical.pause_ms, 250);
        assert_eq!(
            config.strategy_for(RunMode::Historical),
            CountingStrategy::AncestorWalk
        );
        assert_eq!(config.strategy_for(RunMode::Snapshot), CountingStrategy::AncestorWalk);
        assert_eq!(config.output_for(RunMode::Historical), Path::new("trend.json"));
        assert_eq!(config.output_for(RunMode::Snapshot), Path::new("word_counts.json"));
    }

    #[test]
    fn test_validate_rejects_zero_minimums_from_file() {
        let mut config: Config = toml::from_str("[api]\ntimeout_seconds = 0\n").unwrap();
        config.merge_with_args(&make_args());
        assert!(config.validate().is_err());

        let mut args = make_args();
        args.timeout = Some(30);
        config.merge_with_args(&args);
        assert!(config.validate().is_ok());

        let config: Config = toml::from_str("[historical]\nmax_dates = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config: Config = toml::from_str("[api]\nbase_url = \"ftp://example\"\n").unwrap();
        assert!(config.validate().is_err());

        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[output]"));
        assert!(toml_str.contains("[historical]"));
        assert!(toml_str.contains("historical_strategy = \"container-scoped\""));

        let round_trip: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(round_trip.historical.max_dates, 3);
    }
}
