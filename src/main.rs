//! ecfr-wordcount - Word counts per federal agency from the eCFR
//!
//! A CLI tool that downloads the Electronic Code of Federal Regulations,
//! attributes regulatory text to the issuing agency, and writes per-agency
//! word counts as a current snapshot or as a time series.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (config, title catalog unavailable, artifact I/O, etc.)

mod analysis;
mod api;
mod catalog;
mod cli;
mod config;
mod directory;
mod document;
mod models;
mod report;

use analysis::RunOptions;
use anyhow::{Context, Result};
use api::{ClientConfig, EcfrClient};
use chrono::Local;
use cli::{Args, RunMode};
use config::{Config, CONFIG_FILE};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("ecfr-wordcount v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let result = if args.summary {
        handle_summary(&args)
    } else {
        run(&args).await
    };

    if let Err(e) = result {
        error!("Run failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .ecfr-wordcount.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize the API endpoint, output paths and strategies.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG` takes precedence over the verbosity flags when set.
fn init_logging(args: &Args) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(args.log_level()).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

/// Run the selected mode end to end and write its artifact.
async fn run(args: &Args) -> Result<()> {
    let start_time = Instant::now();

    let mut config = load_config(args)?;
    config.merge_with_args(args);
    config.validate().context("Invalid configuration")?;

    let client = EcfrClient::new(ClientConfig::from(&config.api))
        .context("Failed to initialize the eCFR client")?;

    let options = RunOptions {
        strategy: config.strategy_for(args.mode),
        titles: args.titles.clone(),
        max_dates: config.historical.max_dates,
        pause: Duration::from_millis(config.historical.pause_ms),
        show_progress: !args.quiet && !args.verbose,
    };
    let output = config.output_for(args.mode);

    println!("📥 eCFR: {}", client.base_url());
    println!("   Mode: {:?}", args.mode);
    println!("   Attribution: {}", options.strategy);
    if let Some(ref titles) = options.titles {
        println!("   Titles: {}", titles.join(", "));
    }

    match args.mode {
        RunMode::Snapshot => {
            let totals = analysis::run_snapshot(&client, &options).await?;
            report::write_snapshot(&totals, output)?;

            println!("\n📊 Snapshot Summary:");
            println!("   Agencies: {}", totals.len());
            println!("   Total words: {}", analysis::total_words(&totals));
            println!("\n✅ All agency word counts saved to {}", output.display());
        }
        RunMode::Historical => {
            println!("   Dates per title: {}", options.max_dates);

            let series = analysis::run_historical(&client, &options).await;
            report::write_historical(&series, output)?;

            let dates: std::collections::BTreeSet<&String> =
                series.values().flat_map(|dates| dates.keys()).collect();
            println!("\n📈 History Summary:");
            println!("   Agencies: {}", series.len());
            println!("   Issue dates: {}", dates.len());
            println!("\n✅ Saved to {}", output.display());
        }
    }

    println!(
        "   Duration: {:.1}s (finished {})",
        start_time.elapsed().as_secs_f64(),
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    Ok(())
}

/// Handle --summary: print a ranking from the artifacts on disk.
fn handle_summary(args: &Args) -> Result<()> {
    let mut config = load_config(args)?;
    config.merge_with_args(args);

    let totals = report::load_snapshot(&config.output.snapshot_path)?;

    let history = report::load_historical(&config.output.historical_path)?;
    if history.is_none() {
        warn!(
            "{} not found, skipping historical view",
            config.output.historical_path.display()
        );
    }

    print!("{}", report::generate_summary(&totals, history.as_ref()));
    Ok(())
}
