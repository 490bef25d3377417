//! Sequential snapshot and historical runs.
//!
//! Every request is awaited before the next one is issued. Failures other
//! than a missing title catalog in snapshot mode degrade to empty results.

use crate::analysis::aggregator::{HistoricalAggregator, SnapshotAggregator};
use crate::api::EcfrClient;
use crate::catalog::{issue_date_history, TitleCatalog, DEFAULT_HISTORY_DEPTH};
use crate::directory::build_directory;
use crate::document::{count_title_words, CountingStrategy};
use crate::models::{HistoricalResult, SnapshotResult, TitleDateEntry};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Options shared by both run modes.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Attribution strategy applied to every document.
    pub strategy: CountingStrategy,
    /// Restrict the run to these title numbers.
    pub titles: Option<Vec<String>>,
    /// Issue dates per title in historical mode.
    pub max_dates: usize,
    /// Fixed pause after each historical document fetch.
    pub pause: Duration,
    pub show_progress: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            strategy: CountingStrategy::AncestorWalk,
            titles: None,
            max_dates: DEFAULT_HISTORY_DEPTH,
            pause: Duration::from_millis(500),
            show_progress: false,
        }
    }
}

impl RunOptions {
    fn select(&self, catalog: TitleCatalog) -> TitleCatalog {
        match &self.titles {
            Some(titles) => catalog.restrict_to(titles),
            None => catalog,
        }
    }
}

fn progress_bar(len: usize, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );
    pb
}

/// Word counts per agency at each title's latest issue date.
///
/// Fails only when the title catalog cannot be fetched.
pub async fn run_snapshot(client: &EcfrClient, options: &RunOptions) -> Result<SnapshotResult> {
    let directory = build_directory(client).await;

    let catalog = TitleCatalog::fetch(client)
        .await
        .context("Failed to fetch the title catalog")?;
    let catalog = options.select(catalog);
    if catalog.is_empty() {
        warn!("No titles to process");
    }
    let entries = catalog.latest_dates();

    info!(
        "Snapshot over {} titles ({} attribution)",
        entries.len(),
        options.strategy
    );

    let progress = progress_bar(entries.len(), options.show_progress);
    let mut aggregator = SnapshotAggregator::new();

    for entry in &entries {
        debug!("Processing {}", entry);
        progress.set_message(entry.to_string());

        let partial = count_title_words(client, &directory, entry, options.strategy).await;
        aggregator.fold(&partial);
        progress.inc(1);
    }

    progress.finish_and_clear();
    info!("Folded {} documents", aggregator.documents());

    Ok(aggregator.finish())
}

/// Word counts per agency for up to `max_dates` recent issue dates of
/// every title.
///
/// A missing title catalog yields an empty result.
pub async fn run_historical(client: &EcfrClient, options: &RunOptions) -> HistoricalResult {
    let directory = build_directory(client).await;

    let catalog = match TitleCatalog::fetch(client).await {
        Ok(catalog) => options.select(catalog),
        Err(e) => {
            warn!("Failed to fetch titles: {}", e);
            eprintln!("❌ Failed to fetch titles.");
            return HistoricalResult::new();
        }
    };

    info!(
        "History over {} titles, {} dates each ({} attribution)",
        catalog.len(),
        options.max_dates,
        options.strategy
    );

    let progress = progress_bar(catalog.len(), options.show_progress);
    let mut aggregator = HistoricalAggregator::new();

    for title in catalog.title_numbers() {
        debug!("Processing Title {}", title);
        progress.set_message(format!("Title {}", title));

        for issue_date in issue_date_history(client, title, options.max_dates).await {
            let entry = TitleDateEntry::new(title, issue_date);
            debug!("Counting {}", entry);
            progress.set_message(entry.to_string());

            let partial = count_title_words(client, &directory, &entry, options.strategy).await;
            aggregator.fold(&entry.issue_date, &partial);

            if !options.pause.is_zero() {
                tokio::time::sleep(options.pause).await;
            }
        }

        progress.inc(1);
    }

    progress.finish_and_clear();
    info!("Folded {} documents", aggregator.documents());

    aggregator.finish()
}
