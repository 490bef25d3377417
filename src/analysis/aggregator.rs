//! Folding per-document partials into run totals.
//!
//! Each aggregator owns its accumulator for the length of one run and is
//! consumed by `finish`.

use crate::models::{HistoricalResult, SnapshotResult, WordCountPartial};

/// Cumulative word count per agency across titles.
#[derive(Debug, Default)]
pub struct SnapshotAggregator {
    totals: SnapshotResult,
    documents: usize,
}

impl SnapshotAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one document's partial to the running totals.
    pub fn fold(&mut self, partial: &WordCountPartial) {
        for (agency, count) in partial.iter() {
            *self.totals.entry(agency.to_string()).or_insert(0) += count;
        }
        self.documents += 1;
    }

    /// Number of partials folded so far.
    pub fn documents(&self) -> usize {
        self.documents
    }

    pub fn finish(self) -> SnapshotResult {
        self.totals
    }
}

/// Word count per agency per issue date, summed across titles.
#[derive(Debug, Default)]
pub struct HistoricalAggregator {
    series: HistoricalResult,
    documents: usize,
}

impl HistoricalAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one document's partial under its issue date.
    pub fn fold(&mut self, issue_date: &str, partial: &WordCountPartial) {
        for (agency, count) in partial.iter() {
            *self
                .series
                .entry(agency.to_string())
                .or_default()
                .entry(issue_date.to_string())
                .or_insert(0) += count;
        }
        self.documents += 1;
    }

    pub fn documents(&self) -> usize {
        self.documents
    }

    pub fn finish(self) -> HistoricalResult {
        self.series
    }
}

/// Agencies ranked by word count, largest first; ties are broken by name.
pub fn rank_agencies(totals: &SnapshotResult) -> Vec<(&str, u64)> {
    let mut ranked: Vec<(&str, u64)> = totals
        .iter()
        .map(|(agency, count)| (agency.as_str(), *count))
        .collect();

    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
}

/// Total words across all agencies.
pub fn total_words(totals: &SnapshotResult) -> u64 {
    totals.values().sum()
}
