//! Wire types for the eCFR JSON endpoints.
//!
//! Every field is optional: a record missing a field is skipped by the
//! caller instead of failing the whole payload.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Treats an explicit `null` the same as a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `GET /api/admin/v1/agencies.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgenciesResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub agencies: Vec<AgencyRecord>,
}

/// A top-level agency or one of its children.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgencyRecord {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub cfr_references: Vec<CfrReference>,
    #[serde(default, deserialize_with = "nullable")]
    pub children: Vec<AgencyRecord>,
}

impl AgencyRecord {
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CfrReference {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub chapter: Option<Value>,
}

impl CfrReference {
    /// Title number in decimal string form, if present and non-empty.
    pub fn title(&self) -> Option<String> {
        self.title.as_ref().and_then(normalize_title)
    }

    /// Chapter code exactly as published, if present and non-empty.
    pub fn chapter(&self) -> Option<&str> {
        non_empty_str(self.chapter.as_ref())
    }
}

/// `GET /api/versioner/v1/titles.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitlesResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub titles: Vec<TitleRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleRecord {
    #[serde(default)]
    pub number: Option<Value>,
    #[serde(default)]
    pub latest_issue_date: Option<Value>,
}

impl TitleRecord {
    pub fn number(&self) -> Option<String> {
        self.number.as_ref().and_then(normalize_title)
    }

    pub fn latest_issue_date(&self) -> Option<&str> {
        non_empty_str(self.latest_issue_date.as_ref())
    }
}

/// `GET /api/versioner/v1/versions/title-{N}.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionsResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub content_versions: Vec<ContentVersion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentVersion {
    #[serde(default)]
    pub issue_date: Option<Value>,
}

impl ContentVersion {
    pub fn issue_date(&self) -> Option<&str> {
        non_empty_str(self.issue_date.as_ref())
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|text| !text.is_empty())
}

/// Normalizes a title number to its string form.
///
/// The agencies endpoint publishes titles as integers, but strings are
/// accepted too. Zero, empty strings and non-scalar values count as absent.
pub fn normalize_title(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title(&json!(7)), Some("7".to_string()));
        assert_eq!(normalize_title(&json!("12")), Some("12".to_string()));
        assert_eq!(normalize_title(&json!(0)), None);
        assert_eq!(normalize_title(&json!("")), None);
        assert_eq!(normalize_title(&Value::Null), None);
        assert_eq!(normalize_title(&json!([7])), None);
    }

    #[test]
    fn test_agencies_tolerate_missing_and_null_fields() {
        let payload = json!({
            "agencies": [
                { "name": "Department of Agriculture", "children": null },
                { "cfr_references": [{ "title": 7 }] },
                {
                    "name": "Department of Energy",
                    "cfr_references": [{ "title": 10, "chapter": "II" }],
                    "children": [{ "name": "Federal Energy Regulatory Commission" }]
                }
            ]
        });

        let response: AgenciesResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(response.agencies.len(), 3);
        assert!(response.agencies[0].children.is_empty());
        assert!(response.agencies[1].name().is_none());
        assert_eq!(response.agencies[2].cfr_references[0].title().as_deref(), Some("10"));
        assert_eq!(response.agencies[2].cfr_references[0].chapter(), Some("II"));
        assert!(response.agencies[2].children[0].cfr_references.is_empty());
    }

    #[test]
    fn test_non_string_chapter_is_absent() {
        let reference: CfrReference =
            serde_json::from_value(json!({ "title": 5, "chapter": 3 })).unwrap();
        assert_eq!(reference.title().as_deref(), Some("5"));
        assert!(reference.chapter().is_none());
    }

    #[test]
    fn test_titles_and_versions_parse() {
        let titles: TitlesResponse = serde_json::from_value(json!({
            "titles": [
                { "number": 1, "latest_issue_date": "2024-01-05" },
                { "number": 2 }
            ]
        }))
        .unwrap();
        assert_eq!(titles.titles[0].number().as_deref(), Some("1"));
        assert!(titles.titles[1].latest_issue_date().is_none());

        let versions: VersionsResponse = serde_json::from_value(json!({
            "content_versions": [{ "issue_date": "2024-01-05" }, {}]
        }))
        .unwrap();
        assert_eq!(versions.content_versions.len(), 2);
        assert!(versions.content_versions[1].issue_date().is_none());
    }

    #[test]
    fn test_non_string_dates_do_not_fail_the_payload() {
        let titles: TitlesResponse = serde_json::from_value(json!({
            "titles": [
                { "number": 7, "latest_issue_date": "2024-05-01" },
                { "number": 8, "latest_issue_date": 20240501 },
                { "number": 9, "latest_issue_date": "" }
            ]
        }))
        .unwrap();
        assert_eq!(titles.titles[0].latest_issue_date(), Some("2024-05-01"));
        assert!(titles.titles[1].latest_issue_date().is_none());
        assert!(titles.titles[2].latest_issue_date().is_none());

        let versions: VersionsResponse = serde_json::from_value(json!({
            "content_versions": [{ "issue_date": 5 }, { "issue_date": "2024-05-01" }]
        }))
        .unwrap();
        assert!(versions.content_versions[0].issue_date().is_none());
        assert_eq!(versions.content_versions[1].issue_date(), Some("2024-05-01"));
    }
}
