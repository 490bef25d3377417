//! Title and issue-date catalog.

use crate::api::types::{TitlesResponse, VersionsResponse};
use crate::api::{EcfrClient, FetchError};
use crate::models::TitleDateEntry;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Default number of issue dates processed per title in historical mode.
pub const DEFAULT_HISTORY_DEPTH: usize = 3;

/// A title as listed by the titles endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTitle {
    pub number: String,
    pub latest_issue_date: Option<String>,
}

/// The list of regulatory titles.
#[derive(Debug, Clone, Default)]
pub struct TitleCatalog {
    titles: Vec<CatalogTitle>,
}

impl TitleCatalog {
    /// Fetches the titles resource.
    ///
    /// Unlike the other fetches, a failure here is surfaced: the caller
    /// decides whether the run can go on without a catalog.
    pub async fn fetch(client: &EcfrClient) -> Result<Self, FetchError> {
        let response = client.fetch_titles().await?;
        Ok(Self::from_response(&response))
    }

    pub fn from_response(response: &TitlesResponse) -> Self {
        let titles = response
            .titles
            .iter()
            .filter_map(|record| {
                let Some(number) = record.number() else {
                    debug!("Skipping title record without a number");
                    return None;
                };
                Some(CatalogTitle {
                    number,
                    latest_issue_date: record.latest_issue_date().map(String::from),
                })
            })
            .collect();

        Self { titles }
    }

    /// Keeps only the listed title numbers, preserving catalog order.
    pub fn restrict_to(mut self, numbers: &[String]) -> Self {
        self.titles.retain(|title| numbers.contains(&title.number));
        self
    }

    /// One (title, latest issue date) entry per title.
    ///
    /// Titles without a latest issue date are left out.
    pub fn latest_dates(&self) -> Vec<TitleDateEntry> {
        self.titles
            .iter()
            .filter_map(|title| {
                title
                    .latest_issue_date
                    .as_ref()
                    .map(|date| TitleDateEntry::new(title.number.clone(), date.clone()))
            })
            .collect()
    }

    pub fn title_numbers(&self) -> impl Iterator<Item = &str> {
        self.titles.iter().map(|title| title.number.as_str())
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

/// Fetches the `max_dates` most recent issue dates of a title, newest first.
///
/// A failed fetch returns no dates, which leaves the title out of the
/// historical result.
pub async fn issue_date_history(client: &EcfrClient, title: &str, max_dates: usize) -> Vec<String> {
    match client.fetch_versions(title).await {
        Ok(response) => recent_issue_dates(&response, max_dates),
        Err(e) => {
            warn!("Failed to fetch versions for title {}: {}", title, e);
            Vec::new()
        }
    }
}

/// Distinct issue dates across all content versions, newest first.
pub fn recent_issue_dates(response: &VersionsResponse, max_dates: usize) -> Vec<String> {
    let distinct: BTreeSet<&str> = response
        .content_versions
        .iter()
        .filter_map(|version| version.issue_date())
        .collect();

    distinct
        .into_iter()
        .rev()
        .take(max_dates)
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ClientConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn titles(payload: serde_json::Value) -> TitlesResponse {
        serde_json::from_value(payload).unwrap()
    }

    fn versions(payload: serde_json::Value) -> VersionsResponse {
        serde_json::from_value(payload).unwrap()
    }

    #[test]
    fn test_latest_dates() {
        let catalog = TitleCatalog::from_response(&titles(json!({
            "titles": [
                { "number": 1, "latest_issue_date": "2024-01-05" },
                { "number": 35, "latest_issue_date": null },
                { "latest_issue_date": "2024-02-01" },
                { "number": 7, "latest_issue_date": "2024-05-01" }
            ]
        })));

        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.latest_dates(),
            vec![
                TitleDateEntry::new("1", "2024-01-05"),
                TitleDateEntry::new("7", "2024-05-01"),
            ]
        );
        assert_eq!(catalog.title_numbers().collect::<Vec<_>>(), vec!["1", "35", "7"]);
    }

    #[test]
    fn test_restrict_to() {
        let catalog = TitleCatalog::from_response(&titles(json!({
            "titles": [
                { "number": 1, "latest_issue_date": "2024-01-05" },
                { "number": 2, "latest_issue_date": "2024-01-06" },
                { "number": 3, "latest_issue_date": "2024-01-07" }
            ]
        })))
        .restrict_to(&["3".to_string(), "1".to_string()]);

        assert_eq!(catalog.title_numbers().collect::<Vec<_>>(), vec!["1", "3"]);
    }

    #[test]
    fn test_recent_issue_dates_dedup_sort_truncate() {
        let response = versions(json!({
            "content_versions": [
                { "issue_date": "2023-03-01" },
                { "issue_date": "2024-06-15" },
                { "issue_date": "2022-11-30" },
                { "issue_date": "2024-06-15" },
                { "issue_date": "2024-01-10" },
                {}
            ]
        }));

        assert_eq!(
            recent_issue_dates(&response, DEFAULT_HISTORY_DEPTH),
            vec!["2024-06-15", "2024-01-10", "2023-03-01"]
        );
        assert_eq!(recent_issue_dates(&response, 1), vec!["2024-06-15"]);
    }

    #[test]
    fn test_recent_issue_dates_fewer_than_depth() {
        let response = versions(json!({ "content_versions": [{ "issue_date": "2024-01-10" }] }));
        assert_eq!(recent_issue_dates(&response, 3), vec!["2024-01-10"]);
    }

    #[tokio::test]
    async fn test_history_fetch_failure_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/versioner/v1/versions/title-4.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = EcfrClient::new(ClientConfig {
            base_url: server.uri(),
            ..ClientConfig::default()
        })
        .unwrap();

        assert!(issue_date_history(&client, "4", 3).await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_dates_are_skipped_not_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/versioner/v1/titles.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "titles": [
                    { "number": 7, "latest_issue_date": "2024-05-01" },
                    { "number": 8, "latest_issue_date": 20240501 }
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/versioner/v1/versions/title-7.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content_versions": [{ "issue_date": 5 }, { "issue_date": "2024-05-01" }]
            })))
            .mount(&server)
            .await;

        let client = EcfrClient::new(ClientConfig {
            base_url: server.uri(),
            ..ClientConfig::default()
        })
        .unwrap();

        let catalog = TitleCatalog::fetch(&client).await.unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.latest_dates(), vec![TitleDateEntry::new("7", "2024-05-01")]);

        assert_eq!(issue_date_history(&client, "7", 3).await, vec!["2024-05-01"]);
    }
}
