//! Chapter attribution and word counting over a parsed title document.
//!
//! Two strategies are supported and deliberately kept apart, since they
//! disagree on irregular documents:
//!
//! - [`CountingStrategy::AncestorWalk`] attributes each `P` element to the
//!   nearest `DIV*` ancestor whose `HEAD` reads `CHAPTER <code>`.
//! - [`CountingStrategy::ContainerScoped`] sums every `P` below each `DIV3`
//!   element, using the container's `N` attribute as the chapter code.

use crate::document::tree::{Document, NodeId};
use crate::models::{AgencyDirectory, WordCountPartial};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

const PARAGRAPH_TAG: &str = "P";
const HEADING_TAG: &str = "HEAD";
const DIVISION_PREFIX: &str = "DIV";
const CHAPTER_CONTAINER_TAG: &str = "DIV3";
const CHAPTER_ATTRIBUTE: &str = "N";

/// How paragraphs are attributed to chapters.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum CountingStrategy {
    /// Per-paragraph upward search for a chapter heading
    #[default]
    AncestorWalk,
    /// One pass per `DIV3` chapter container
    ContainerScoped,
}

impl fmt::Display for CountingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountingStrategy::AncestorWalk => write!(f, "ancestor-walk"),
            CountingStrategy::ContainerScoped => write!(f, "container-scoped"),
        }
    }
}

impl CountingStrategy {
    /// Counts the words of one title document per agency.
    pub fn count(self, doc: &Document, title: &str, directory: &AgencyDirectory) -> WordCountPartial {
        match self {
            CountingStrategy::AncestorWalk => count_by_ancestor_walk(doc, title, directory),
            CountingStrategy::ContainerScoped => count_by_container(doc, title, directory),
        }
    }
}

fn chapter_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"CHAPTER\s+([A-Z0-9]+)").expect("valid chapter pattern"))
}

/// Extracts the chapter code from a division heading.
///
/// Matching is case-insensitive and the first occurrence wins, so
/// `"Chapter iv - Food Safety"` yields `"IV"`.
pub fn chapter_from_heading(heading: &str) -> Option<String> {
    let upper = heading.to_uppercase();
    chapter_pattern()
        .captures(&upper)
        .map(|captures| captures[1].to_string())
}

/// Number of whitespace-delimited tokens.
pub fn word_count(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

/// Chapter of the nearest `DIV*` ancestor carrying a chapter heading.
pub fn owning_chapter(doc: &Document, paragraph: NodeId) -> Option<String> {
    doc.ancestors(paragraph).find_map(|ancestor| {
        if !doc.node(ancestor).name.starts_with(DIVISION_PREFIX) {
            return None;
        }
        let heading = doc.first_child_named(ancestor, HEADING_TAG)?;
        chapter_from_heading(doc.node(heading).text()?)
    })
}

fn paragraph_words(doc: &Document, paragraph: NodeId) -> Option<u64> {
    doc.node(paragraph).text().map(word_count)
}

fn count_by_ancestor_walk(
    doc: &Document,
    title: &str,
    directory: &AgencyDirectory,
) -> WordCountPartial {
    let mut partial = WordCountPartial::new();
    let Some(root) = doc.root() else {
        return partial;
    };

    for paragraph in doc.descendants_named(root, PARAGRAPH_TAG) {
        let Some(chapter) = owning_chapter(doc, paragraph) else {
            continue;
        };
        let Some(words) = paragraph_words(doc, paragraph) else {
            continue;
        };
        if let Some(agency) = directory.lookup(title, &chapter) {
            partial.add(agency, words);
        }
    }

    partial
}

fn count_by_container(doc: &Document, title: &str, directory: &AgencyDirectory) -> WordCountPartial {
    let mut partial = WordCountPartial::new();
    let Some(root) = doc.root() else {
        return partial;
    };

    for container in doc.descendants_named(root, CHAPTER_CONTAINER_TAG) {
        let Some(chapter) = doc
            .node(container)
            .attribute(CHAPTER_ATTRIBUTE)
            .filter(|chapter| !chapter.is_empty())
        else {
            continue;
        };

        let words: u64 = doc
            .descendants_named(container, PARAGRAPH_TAG)
            .filter_map(|paragraph| paragraph_words(doc, paragraph))
            .sum();

        if let Some(agency) = directory.lookup(title, chapter) {
            partial.add(agency, words);
        }
    }

    partial
}
