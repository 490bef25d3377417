//! Agency directory construction.
//!
//! Flattens the agency metadata (top-level agencies and their children)
//! into a (title, chapter) -> agency name lookup.

use crate::api::types::{AgenciesResponse, AgencyRecord};
use crate::api::EcfrClient;
use crate::models::{AgencyDirectory, AgencyKey};
use tracing::{debug, info, warn};

/// Fetches agency metadata and builds the directory.
///
/// A failed fetch yields an empty directory. The run continues, but no
/// words can be attributed to any agency.
pub async fn build_directory(client: &EcfrClient) -> AgencyDirectory {
    match client.fetch_agencies().await {
        Ok(response) => {
            let directory = directory_from_response(&response);
            if directory.is_empty() {
                warn!("Agency metadata contained no usable CFR references");
            } else {
                info!(
                    "Agency directory built: {} (title, chapter) entries",
                    directory.len()
                );
            }
            directory
        }
        Err(e) => {
            warn!("Failed to fetch agency metadata: {}", e);
            eprintln!("❌ Failed to fetch agency metadata");
            AgencyDirectory::new()
        }
    }
}

/// Builds the directory from an already decoded agencies payload.
///
/// Each agency's own references are inserted before its children's, in
/// payload order. Colliding keys keep the last name written.
pub fn directory_from_response(response: &AgenciesResponse) -> AgencyDirectory {
    let mut directory = AgencyDirectory::new();

    for agency in &response.agencies {
        insert_references(&mut directory, agency);
        for child in &agency.children {
            insert_references(&mut directory, child);
        }
    }

    directory
}

fn insert_references(directory: &mut AgencyDirectory, agency: &AgencyRecord) {
    let Some(name) = agency.name() else {
        debug!("Skipping agency record without a name");
        return;
    };

    for reference in &agency.cfr_references {
        let (Some(title), Some(chapter)) = (reference.title(), reference.chapter()) else {
            continue;
        };

        let key = AgencyKey::new(title, chapter);
        if let Some(previous) = directory.insert(key.clone(), name) {
            if previous != name {
                debug!("{} reassigned from {} to {}", key, previous, name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ClientConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn response(payload: serde_json::Value) -> AgenciesResponse {
        serde_json::from_value(payload).unwrap()
    }

    #[test]
    fn test_flattens_agencies_and_children() {
        let directory = directory_from_response(&response(json!({
            "agencies": [{
                "name": "Department of Agriculture",
                "cfr_references": [
                    { "title": 7, "chapter": "I" },
                    { "title": 2, "chapter": "IV" }
                ],
                "children": [{
                    "name": "Forest Service",
                    "cfr_references": [{ "title": 36, "chapter": "II" }]
                }]
            }]
        })));

        assert_eq!(directory.len(), 3);
        assert_eq!(directory.lookup("7", "I"), Some("Department of Agriculture"));
        assert_eq!(directory.lookup("2", "IV"), Some("Department of Agriculture"));
        assert_eq!(directory.lookup("36", "II"), Some("Forest Service"));
    }

    #[test]
    fn test_skips_references_missing_title_or_chapter() {
        let directory = directory_from_response(&response(json!({
            "agencies": [{
                "name": "Department of Labor",
                "cfr_references": [
                    { "title": 29 },
                    { "chapter": "V" },
                    { "title": 29, "chapter": "" },
                    { "title": 29, "chapter": "XVII" }
                ]
            }]
        })));

        assert_eq!(directory.len(), 1);
        assert_eq!(directory.lookup("29", "XVII"), Some("Department of Labor"));
    }

    #[test]
    fn test_child_overwrites_parent_on_collision() {
        let directory = directory_from_response(&response(json!({
            "agencies": [{
                "name": "Department of the Treasury",
                "cfr_references": [{ "title": 31, "chapter": "I" }],
                "children": [{
                    "name": "Office of the Secretary",
                    "cfr_references": [{ "title": 31, "chapter": "I" }]
                }]
            }]
        })));

        assert_eq!(directory.lookup("31", "I"), Some("Office of the Secretary"));
    }

    #[test]
    fn test_chapter_is_kept_verbatim() {
        let directory = directory_from_response(&response(json!({
            "agencies": [{
                "name": "Small Business Administration",
                "cfr_references": [{ "title": "13", "chapter": "i " }]
            }]
        })));

        assert_eq!(directory.lookup("13", "i "), Some("Small Business Administration"));
        assert!(directory.lookup("13", "I").is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_yields_empty_directory() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/v1/agencies.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = EcfrClient::new(ClientConfig {
            base_url: server.uri(),
            ..ClientConfig::default()
        })
        .unwrap();

        let directory = build_directory(&client).await;
        assert!(directory.is_empty());
    }
}
