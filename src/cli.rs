//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::document::CountingStrategy;
use clap::Parser;
use std::path::PathBuf;

/// ecfr-wordcount - word counts per federal agency from the eCFR
///
/// Downloads every title of the Electronic Code of Federal Regulations,
/// attributes each paragraph to the agency owning its chapter, and writes
/// the totals to a JSON file.
///
/// Examples:
///   ecfr-wordcount
///   ecfr-wordcount --mode historical --max-dates 3
///   ecfr-wordcount --title 7,40 --strategy container-scoped
///   ecfr-wordcount --summary
///   ecfr-wordcount --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// What to compute
    ///
    /// snapshot: totals at each title's latest issue date.
    /// historical: totals per issue date over the most recent dates of each title.
    #[arg(long, value_enum, default_value = "snapshot")]
    pub mode: RunMode,

    /// Chapter attribution strategy
    ///
    /// Defaults to ancestor-walk for snapshots and container-scoped for history.
    #[arg(long, value_enum, value_name = "STRATEGY")]
    pub strategy: Option<CountingStrategy>,

    /// eCFR service base URL
    #[arg(long, value_name = "URL", env = "ECFR_BASE_URL")]
    pub base_url: Option<String>,

    /// Output file path for the artifact of the selected mode
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Only process these titles (comma-separated)
    ///
    /// Example: --title 7,21
    #[arg(long = "title", value_name = "N", value_delimiter = ',')]
    pub titles: Option<Vec<String>>,

    /// Number of most recent issue dates per title (historical mode)
    #[arg(long, value_name = "COUNT")]
    pub max_dates: Option<usize>,

    /// Pause between document fetches in milliseconds (historical mode)
    #[arg(long, value_name = "MS")]
    pub pause_ms: Option<u64>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .ecfr-wordcount.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Print a ranking from existing artifacts instead of running
    #[arg(long)]
    pub summary: bool,

    /// Generate a default .ecfr-wordcount.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Run mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RunMode {
    /// Latest issue date of every title (default)
    #[default]
    Snapshot,
    /// Most recent issue dates of every title
    Historical,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref base_url) = self.base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err("Base URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.max_dates == Some(0) {
            return Err("Max dates must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if let Some(ref titles) = self.titles {
            if let Some(bad) = titles
                .iter()
                .find(|t| t.is_empty() || !t.chars().all(|c| c.is_ascii_digit()))
            {
                return Err(format!("Invalid title number: '{}'", bad));
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
