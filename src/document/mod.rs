//! Title document word counting.
//!
//! Fetches one title's full XML for one issue date, parses it into a tree
//! and attributes paragraph words to agencies.

pub mod counter;
pub mod tree;

pub use counter::CountingStrategy;
pub use tree::Document;

use crate::api::EcfrClient;
use crate::models::{AgencyDirectory, TitleDateEntry, WordCountPartial};
use tracing::{debug, warn};

/// Counts the words of one (title, issue date) document per agency.
///
/// A failed fetch yields an empty partial for this document only.
pub async fn count_title_words(
    client: &EcfrClient,
    directory: &AgencyDirectory,
    entry: &TitleDateEntry,
    strategy: CountingStrategy,
) -> WordCountPartial {
    let body = match client
        .fetch_title_document(&entry.title, &entry.issue_date)
        .await
    {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to fetch {}: {}", entry, e);
            return WordCountPartial::new();
        }
    };

    let doc = Document::parse(&body);
    if doc.is_empty() {
        warn!("{} contained no XML elements", entry);
        return WordCountPartial::new();
    }
    if doc.is_truncated() {
        warn!("{} was only partially parsed", entry);
    }
    debug!("{}: {} elements, {} bytes", entry, doc.len(), body.len());

    let partial = strategy.count(&doc, &entry.title, directory);
    debug!(
        "{}: {} words attributed to {} agencies ({})",
        entry,
        partial.total(),
        partial.len(),
        strategy
    );
    partial
}
