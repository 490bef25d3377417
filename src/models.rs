//! Data models for agency attribution and word counting.
//!
//! This module contains the core data structures shared by the directory
//! builder, the title catalog, the document word-counter and the aggregator.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Key of the agency directory: a CFR title paired with a chapter code.
///
/// The title is the decimal string form of the title number. The chapter is
/// kept verbatim as published (`"I"`, `"XXVI"`, `"1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgencyKey {
    pub title: String,
    pub chapter: String,
}

impl AgencyKey {
    pub fn new(title: impl Into<String>, chapter: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            chapter: chapter.into(),
        }
    }
}

impl fmt::Display for AgencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "title {} chapter {}", self.title, self.chapter)
    }
}

/// Mapping from (title, chapter) to the name of the issuing agency.
///
/// Built once per run and only read afterwards. Later inserts for the same
/// key replace earlier ones.
#[derive(Debug, Clone, Default)]
pub struct AgencyDirectory {
    entries: HashMap<AgencyKey, String>,
}

impl AgencyDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, returning the agency previously mapped to the key.
    pub fn insert(&mut self, key: AgencyKey, agency: impl Into<String>) -> Option<String> {
        self.entries.insert(key, agency.into())
    }

    /// Looks up the agency owning a chapter of a title.
    pub fn lookup(&self, title: &str, chapter: &str) -> Option<&str> {
        self.entries
            .get(&AgencyKey::new(title, chapter))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(AgencyKey, String)> for AgencyDirectory {
    fn from_iter<I: IntoIterator<Item = (AgencyKey, String)>>(iter: I) -> Self {
        let mut directory = Self::new();
        for (key, agency) in iter {
            directory.insert(key, agency);
        }
        directory
    }
}

/// A title paired with one of its issue dates (`YYYY-MM-DD`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TitleDateEntry {
    pub title: String,
    pub issue_date: String,
}

impl TitleDateEntry {
    pub fn new(title: impl Into<String>, issue_date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            issue_date: issue_date.into(),
        }
    }
}

impl fmt::Display for TitleDateEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Title {} ({})", self.title, self.issue_date)
    }
}

/// Word counts per agency for a single (title, issue date) document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordCountPartial {
    counts: BTreeMap<String, u64>,
}

impl WordCountPartial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds words to an agency.
    ///
    /// The agency is recorded even when `words` is zero: a mapped chapter
    /// with empty paragraphs still shows up in the output with a count of 0.
    pub fn add(&mut self, agency: &str, words: u64) {
        *self.counts.entry(agency.to_string()).or_insert(0) += words;
    }

    pub fn get(&self, agency: &str) -> Option<u64> {
        self.counts.get(agency).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(agency, count)| (agency.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all attributed words.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

/// Cumulative word count per agency across all titles at their latest dates.
pub type SnapshotResult = BTreeMap<String, u64>;

/// Word count per agency per issue date, summed across titles.
pub type HistoricalResult = BTreeMap<String, BTreeMap<String, u64>>;
