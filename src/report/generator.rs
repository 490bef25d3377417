//! Artifact serialization and the plain-text summary.
//!
//! Both artifacts are flat JSON files with keys in sorted order, so
//! identical runs produce byte-identical files.

use crate::analysis::{rank_agencies, total_words};
use crate::models::{HistoricalResult, SnapshotResult};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::Path;

/// Default location of the snapshot artifact.
pub const SNAPSHOT_FILE: &str = "word_counts.json";

/// Default location of the historical artifact.
pub const HISTORICAL_FILE: &str = "historical_word_counts.json";

fn to_pretty_json<T: Serialize>(value: &T, indent: &[u8]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(indent));
    value.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Render the snapshot artifact (four-space indentation).
pub fn generate_snapshot_json(totals: &SnapshotResult) -> Result<Vec<u8>> {
    to_pretty_json(totals, b"    ")
}

/// Render the historical artifact (two-space indentation).
pub fn generate_historical_json(series: &HistoricalResult) -> Result<Vec<u8>> {
    to_pretty_json(series, b"  ")
}

/// Write the snapshot artifact.
pub fn write_snapshot(totals: &SnapshotResult, path: &Path) -> Result<()> {
    let content = generate_snapshot_json(totals)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write snapshot to {}", path.display()))
}

/// Write the historical artifact.
pub fn write_historical(series: &HistoricalResult, path: &Path) -> Result<()> {
    let content = generate_historical_json(series)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write history to {}", path.display()))
}

/// Load the snapshot artifact. A missing file is an error.
pub fn load_snapshot(path: &Path) -> Result<SnapshotResult> {
    if !path.exists() {
        bail!(
            "{} not found. Run a snapshot first (--mode snapshot).",
            path.display()
        );
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse snapshot: {}", path.display()))
}

/// Load the historical artifact. Returns `Ok(None)` if the file doesn't exist.
pub fn load_historical(path: &Path) -> Result<Option<HistoricalResult>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history: {}", path.display()))?;
    let series = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse history: {}", path.display()))?;
    Ok(Some(series))
}

/// Generate a plain-text ranking of agencies, followed by their history.
pub fn generate_summary(totals: &SnapshotResult, history: Option<&HistoricalResult>) -> String {
    let mut output = String::new();

    output.push_str("Total Word Count by Federal Agency (latest issue date)\n\n");

    let ranked = rank_agencies(totals);
    if ranked.is_empty() {
        output.push_str("  No words attributed to any agency.\n");
    } else {
        let width = ranked
            .iter()
            .map(|(_, count)| count.to_string().len())
            .max()
            .unwrap_or(1);
        for (agency, count) in &ranked {
            output.push_str(&format!("  {:>width$}  {}\n", count, agency, width = width));
        }
    }

    output.push_str(&format!(
        "\nAgencies: {} | Total words: {}\n",
        ranked.len(),
        total_words(totals)
    ));

    if let Some(history) = history {
        output.push_str(&generate_history_section(history));
    }

    output
}

fn generate_history_section(history: &HistoricalResult) -> String {
    let mut section = String::new();

    section.push_str("\nHistorical Trends\n");

    for (agency, dates) in history {
        section.push_str(&format!("\n  {}\n", agency));
        // BTreeMap keys are ISO dates, so iteration is chronological.
        for (date, count) in dates {
            section.push_str(&format!("    {}  {}\n", date, count));
        }
    }

    section
}
