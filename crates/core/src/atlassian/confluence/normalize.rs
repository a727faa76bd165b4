//! Normalization of Confluence page payloads across API generations.
//!
//! The current REST API (`/wiki/api/v2`) returns flat pages with a `spaceId`
//! and cursor pagination. The legacy content API (`/wiki/rest/api`) nests a
//! `space` object, carries `version.when`/`version.by` and paginates by
//! offset. Both end up as [`Page`] inside a [`SearchResult`].
//!
//! Each result is classified first, then parsed strictly against the record
//! for its generation. A result that fails its strict parse is not an error:
//! it is re-derived field by field from the raw object and reported back as a
//! fallback so the caller can log it.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::page::{Page, PageLinks, PageVersion, SpaceRef, VersionAuthor};
use crate::error::{SearchError, Service};
use crate::search::{Pagination, ResultLinks, SearchResult};

/// Confluence API generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Generation {
    /// `/wiki/api/v2`, flat `spaceId`, cursor pagination.
    Current,
    /// `/wiki/rest/api`, nested `space`, offset pagination.
    Legacy,
}

impl std::str::FromStr for Generation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v2" | "current" => Ok(Generation::Current),
            "v1" | "legacy" => Ok(Generation::Legacy),
            other => Err(format!("unknown Confluence API generation '{other}' (expected v2 or v1)")),
        }
    }
}

/// Whether a single page record looks like the current generation: it has a
/// `spaceId` or `createdAt` and no nested `space` object.
pub fn is_current_page(page: &Value) -> bool {
    (page.get("spaceId").is_some() || page.get("createdAt").is_some())
        && !page.get("space").is_some_and(Value::is_object)
}

/// Classify a search payload by its first result. `None` for an empty or
/// malformed result list.
pub fn detect_generation(payload: &Value) -> Option<Generation> {
    let first = payload.get("results")?.as_array()?.first()?;
    if is_current_page(first) {
        Some(Generation::Current)
    } else {
        Some(Generation::Legacy)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, got {other}"
        ))),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordLinks {
    pub webui: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editui: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tinyui: Option<String>,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentVersionRecord {
    pub number: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor_edit: Option<bool>,
}

/// Page record as served by `/wiki/api/v2/pages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPageRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub status: String,
    pub title: String,
    #[serde(deserialize_with = "string_or_number")]
    pub space_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<CurrentVersionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(rename = "_links")]
    pub links: RecordLinks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacySpaceRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyUserRecord {
    #[serde(rename = "type", default = "user_type")]
    pub user_type: String,
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub display_name: String,
}

fn user_type() -> String {
    "user".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyVersionRecord {
    pub number: u64,
    pub when: String,
    pub by: LegacyUserRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor_edit: Option<bool>,
}

fn page_type() -> String {
    "page".to_string()
}

fn current_status() -> String {
    "current".to_string()
}

/// Content record as served by `/wiki/rest/api/content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyPageRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "type", default = "page_type")]
    pub content_type: String,
    #[serde(default = "current_status")]
    pub status: String,
    pub title: String,
    pub space: LegacySpaceRecord,
    pub version: LegacyVersionRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(rename = "_links")]
    pub links: RecordLinks,
}

/// A single result, tagged by the shape it was parsed as.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPage {
    Current(CurrentPageRecord),
    Legacy(LegacyPageRecord),
    /// Anything that failed its strict parse. Converted defensively.
    Unknown(Map<String, Value>),
}

fn has_legacy_markers(item: &Value) -> bool {
    item.get("space").is_some_and(Value::is_object)
        && item.pointer("/version/when").is_some()
        && item.pointer("/version/by").is_some_and(Value::is_object)
}

fn mismatch(message: impl Into<String>) -> SearchError {
    SearchError::SchemaMismatch {
        service: Service::Confluence,
        message: message.into(),
    }
}

impl RawPage {
    /// Classify and strictly parse one result. The second element explains
    /// why a result fell back to [`RawPage::Unknown`].
    ///
    /// Fails only when the result is not a JSON object.
    pub fn parse(item: &Value) -> Result<(RawPage, Option<String>), SearchError> {
        let map = item
            .as_object()
            .ok_or_else(|| mismatch(format!("expected a page object, got {item}")))?;

        if is_current_page(item) {
            return Ok(match CurrentPageRecord::deserialize(item) {
                Ok(record) => (RawPage::Current(record), None),
                Err(e) => (RawPage::Unknown(map.clone()), Some(e.to_string())),
            });
        }

        if has_legacy_markers(item) {
            return Ok(match LegacyPageRecord::deserialize(item) {
                Ok(record) => (RawPage::Legacy(record), None),
                Err(e) => (RawPage::Unknown(map.clone()), Some(e.to_string())),
            });
        }

        Ok((
            RawPage::Unknown(map.clone()),
            Some("neither current nor legacy page shape".to_string()),
        ))
    }

    pub fn into_page(self) -> Page {
        match self {
            RawPage::Current(record) => from_current(record),
            RawPage::Legacy(record) => from_legacy(record),
            RawPage::Unknown(map) => from_unknown(&map),
        }
    }
}

fn links_from(record: RecordLinks) -> PageLinks {
    PageLinks {
        webui: record.webui,
        editui: record.editui,
        tinyui: record.tinyui,
        self_link: record.self_link,
        base: record.base,
    }
}

fn from_current(record: CurrentPageRecord) -> Page {
    let version = record.version.map(|v| PageVersion {
        number: v.number,
        when: v.created_at.or_else(|| record.created_at.clone()),
        by: VersionAuthor {
            account_id: v
                .author_id
                .or_else(|| record.author_id.clone())
                .unwrap_or_default(),
            display_name: String::new(),
        },
        message: v.message,
        minor_edit: v.minor_edit,
    });

    Page {
        id: record.id,
        content_type: page_type(),
        status: record.status,
        title: record.title,
        space: Some(SpaceRef {
            id: record.space_id.clone(),
            key: String::new(),
            name: String::new(),
        }),
        space_id: record.space_id,
        parent_id: record.parent_id,
        parent_type: record.parent_type,
        author_id: record.author_id,
        owner_id: record.owner_id,
        created_at: record.created_at,
        version,
        body: record.body,
        links: links_from(record.links),
    }
}

fn from_legacy(record: LegacyPageRecord) -> Page {
    let author = record.version.by;
    Page {
        id: record.id,
        content_type: record.content_type,
        status: record.status,
        title: record.title,
        space_id: record.space.id.clone(),
        space: Some(SpaceRef {
            id: record.space.id,
            key: record.space.key,
            name: record.space.name,
        }),
        parent_id: None,
        parent_type: None,
        author_id: Some(author.account_id.clone()).filter(|id| !id.is_empty()),
        owner_id: None,
        created_at: None,
        version: Some(PageVersion {
            number: record.version.number,
            when: Some(record.version.when),
            by: VersionAuthor {
                account_id: author.account_id,
                display_name: author.display_name,
            },
            message: record.version.message,
            minor_edit: record.version.minor_edit,
        }),
        body: record.body,
        links: links_from(record.links),
    }
}

fn scalar(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn from_unknown(map: &Map<String, Value>) -> Page {
    let field = |key: &str| scalar(map.get(key));
    let space = map.get("space").and_then(Value::as_object);
    let space_field = |key: &str| scalar(space.and_then(|s| s.get(key)));
    let links = map.get("_links").and_then(Value::as_object);
    let link = |key: &str| scalar(links.and_then(|l| l.get(key)));

    let space_id = field("spaceId")
        .or_else(|| space_field("id"))
        .unwrap_or_default();
    let author_id = field("authorId");
    let created_at = field("createdAt");

    let version = map
        .get("version")
        .and_then(Value::as_object)
        .and_then(|v| {
            let number = v.get("number").and_then(Value::as_u64)?;
            let by = v.get("by").and_then(Value::as_object);
            Some(PageVersion {
                number,
                when: scalar(v.get("when"))
                    .or_else(|| scalar(v.get("createdAt")))
                    .or_else(|| created_at.clone()),
                by: VersionAuthor {
                    account_id: scalar(by.and_then(|b| b.get("accountId")))
                        .or_else(|| scalar(v.get("authorId")))
                        .or_else(|| author_id.clone())
                        .unwrap_or_default(),
                    display_name: scalar(by.and_then(|b| b.get("displayName")))
                        .unwrap_or_default(),
                },
                message: scalar(v.get("message")),
                minor_edit: v.get("minorEdit").and_then(Value::as_bool),
            })
        });

    let space = if space.is_some() || !space_id.is_empty() {
        Some(SpaceRef {
            id: space_id.clone(),
            key: space_field("key").unwrap_or_default(),
            name: space_field("name").unwrap_or_default(),
        })
    } else {
        None
    };

    Page {
        id: field("id").unwrap_or_default(),
        content_type: field("type").unwrap_or_else(page_type),
        status: field("status").unwrap_or_else(current_status),
        title: field("title").unwrap_or_default(),
        space_id,
        space,
        parent_id: field("parentId"),
        parent_type: field("parentType"),
        author_id,
        owner_id: field("ownerId"),
        created_at,
        version,
        body: map.get("body").filter(|b| b.is_object()).cloned(),
        links: PageLinks {
            webui: link("webui").unwrap_or_default(),
            editui: link("editui"),
            tinyui: link("tinyui"),
            self_link: link("self"),
            base: link("base"),
        },
    }
}

/// A normalized result plus the results that needed the defensive fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub result: SearchResult<Page>,
    /// One entry per result that failed its strict parse.
    pub fallbacks: Vec<String>,
}

/// Normalize a page search payload.
///
/// The generation is detected from the first result. `hint` only decides the
/// pagination style when there is no result to detect from.
pub fn normalize(payload: &Value, hint: Option<Generation>) -> Result<SearchResult<Page>, SearchError> {
    normalize_with_report(payload, hint).map(|normalized| normalized.result)
}

/// Like [`normalize`], also reporting which results fell back.
pub fn normalize_with_report(
    payload: &Value,
    hint: Option<Generation>,
) -> Result<Normalized, SearchError> {
    let items = payload
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| mismatch("response has no `results` array"))?;

    let mut results = Vec::with_capacity(items.len());
    let mut fallbacks = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let (raw, fallback) = RawPage::parse(item)?;
        if let Some(reason) = fallback {
            let id = scalar(item.get("id")).unwrap_or_else(|| "?".to_string());
            fallbacks.push(format!("result {index} (id {id}): {reason}"));
        }
        results.push(raw.into_page());
    }

    let generation = detect_generation(payload)
        .or(hint)
        .unwrap_or(Generation::Legacy);

    let links = payload.get("_links");
    let link = |key: &str| links.and_then(|l| l.get(key)).and_then(Value::as_str).map(str::to_string);

    let count = results.len() as u64;
    let pagination = match generation {
        Generation::Current => Pagination::Cursor { next: link("next") },
        Generation::Legacy => {
            let number = |key: &str| payload.get(key).and_then(Value::as_u64);
            Pagination::Offset {
                start: number("start").unwrap_or(0),
                limit: number("limit").unwrap_or(count),
                size: number("size").unwrap_or(count),
            }
        }
    };

    Ok(Normalized {
        result: SearchResult {
            results,
            pagination,
            total: payload.get("totalSize").and_then(Value::as_u64),
            links: ResultLinks {
                context: link("context"),
                self_link: link("self"),
                base: link("base"),
            },
        },
        fallbacks,
    })
}

/// Normalize a single page payload, e.g. from `GET /pages/{id}`.
pub fn normalize_page(item: &Value) -> Result<Page, SearchError> {
    RawPage::parse(item).map(|(raw, _)| raw.into_page())
}

/// Rebuild a legacy content record from a canonical page.
pub fn to_legacy_page(page: &Page) -> LegacyPageRecord {
    let space = page.space.clone().unwrap_or_else(|| SpaceRef {
        id: page.space_id.clone(),
        ..Default::default()
    });
    let version = page.version.clone().unwrap_or_default();

    LegacyPageRecord {
        id: page.id.clone(),
        content_type: page.content_type.clone(),
        status: page.status.clone(),
        title: page.title.clone(),
        space: LegacySpaceRecord {
            id: space.id,
            key: space.key,
            name: space.name,
        },
        version: LegacyVersionRecord {
            number: version.number,
            when: version
                .when
                .or_else(|| page.created_at.clone())
                .unwrap_or_default(),
            by: LegacyUserRecord {
                user_type: user_type(),
                account_id: version.by.account_id,
                display_name: version.by.display_name,
            },
            message: version.message,
            minor_edit: version.minor_edit,
        },
        body: page.body.clone(),
        links: RecordLinks {
            webui: page.links.webui.clone(),
            editui: page.links.editui.clone(),
            tinyui: page.links.tinyui.clone(),
            self_link: page.links.self_link.clone(),
            base: page.links.base.clone(),
        },
    }
}

/// Rebuild a current-generation page record from a canonical page.
pub fn to_current_page(page: &Page) -> CurrentPageRecord {
    let space_id = if page.space_id.is_empty() {
        page.space.as_ref().map(|s| s.id.clone()).unwrap_or_default()
    } else {
        page.space_id.clone()
    };
    let status = if page.status.is_empty() {
        current_status()
    } else {
        page.status.clone()
    };

    CurrentPageRecord {
        id: page.id.clone(),
        status,
        title: page.title.clone(),
        space_id,
        parent_id: page.parent_id.clone(),
        parent_type: page.parent_type.clone().or_else(|| Some(page_type())),
        author_id: page
            .author_id
            .clone()
            .or_else(|| page.version.as_ref().map(|v| v.by.account_id.clone())),
        owner_id: page.owner_id.clone(),
        created_at: page
            .created_at
            .clone()
            .or_else(|| page.version.as_ref().and_then(|v| v.when.clone())),
        version: page.version.as_ref().map(|v| CurrentVersionRecord {
            number: v.number,
            created_at: v.when.clone(),
            author_id: Some(v.by.account_id.clone()).filter(|id| !id.is_empty()),
            message: v.message.clone(),
            minor_edit: v.minor_edit,
        }),
        body: page.body.clone(),
        links: RecordLinks {
            webui: page.links.webui.clone(),
            editui: page.links.editui.clone().or_else(|| page.links.self_link.clone()),
            tinyui: page.links.tinyui.clone(),
            self_link: None,
            base: page.links.base.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn current_page(id: &str, title: &str) -> Value {
        json!({
            "id": id,
            "status": "current",
            "title": title,
            "spaceId": "98304",
            "parentId": "1000",
            "parentType": "page",
            "authorId": "author-1",
            "ownerId": "owner-1",
            "createdAt": "2024-03-01T10:00:00.000Z",
            "version": {
                "number": 4,
                "message": "",
                "minorEdit": false,
                "authorId": "editor-9",
                "createdAt": "2024-03-05T10:00:00.000Z"
            },
            "_links": {
                "webui": format!("/spaces/OPS/pages/{id}"),
                "editui": format!("/pages/resumedraft.action?draftId={id}"),
                "tinyui": "/x/AbC"
            }
        })
    }

    fn current_payload() -> Value {
        json!({
            "results": [current_page("101", "Kong Runbook"), current_page("102", "Kong Upgrade")],
            "_links": {
                "next": "/wiki/api/v2/pages?cursor=eyJpZCI6MTAyfQ",
                "base": "https://example.atlassian.net/wiki"
            }
        })
    }

    fn legacy_payload() -> Value {
        json!({
            "results": [{
                "id": "2001",
                "type": "page",
                "status": "current",
                "title": "Legacy Runbook",
                "space": { "id": 33, "key": "OPS", "name": "Operations" },
                "version": {
                    "number": 7,
                    "when": "2023-12-01T09:00:00.000Z",
                    "by": { "type": "known", "accountId": "legacy-author", "displayName": "Old Timer" },
                    "minorEdit": true
                },
                "_links": {
                    "webui": "/spaces/OPS/pages/2001/Legacy+Runbook",
                    "self": "https://example.atlassian.net/wiki/rest/api/content/2001"
                }
            }],
            "start": 25,
            "limit": 25,
            "size": 1,
            "_links": {
                "base": "https://example.atlassian.net/wiki",
                "context": "/wiki",
                "self": "https://example.atlassian.net/wiki/rest/api/content/search"
            }
        })
    }

    #[test]
    fn test_classifier() {
        assert!(is_current_page(&json!({ "spaceId": "1" })));
        assert!(is_current_page(&json!({ "createdAt": "2024-01-01" })));
        assert!(!is_current_page(&json!({ "spaceId": "1", "space": { "key": "OPS" } })));
        assert!(!is_current_page(&json!({ "title": "x" })));

        assert_eq!(detect_generation(&current_payload()), Some(Generation::Current));
        assert_eq!(detect_generation(&legacy_payload()), Some(Generation::Legacy));
        assert_eq!(detect_generation(&json!({ "results": [] })), None);
    }

    #[test]
    fn test_generation_from_str() {
        assert_eq!("v2".parse::<Generation>(), Ok(Generation::Current));
        assert_eq!("LEGACY".parse::<Generation>(), Ok(Generation::Legacy));
        assert!("v3".parse::<Generation>().is_err());
    }

    #[test]
    fn test_normalize_current_generation() {
        // Arrange
        let payload = current_payload();

        // Act
        let normalized = normalize_with_report(&payload, None).unwrap();

        // Assert
        assert!(normalized.fallbacks.is_empty());
        let result = normalized.result;
        assert_eq!(result.len(), 2);
        assert_eq!(
            result.pagination,
            Pagination::Cursor {
                next: Some("/wiki/api/v2/pages?cursor=eyJpZCI6MTAyfQ".to_string())
            }
        );
        assert_eq!(result.links.base.as_deref(), Some("https://example.atlassian.net/wiki"));

        let page = &result.results[0];
        assert_eq!(page.id, "101");
        assert_eq!(page.content_type, "page");
        assert_eq!(page.space_id, "98304");
        assert_eq!(
            page.space,
            Some(SpaceRef {
                id: "98304".to_string(),
                key: String::new(),
                name: String::new()
            })
        );
        let version = page.version.as_ref().unwrap();
        assert_eq!(version.number, 4);
        assert_eq!(version.by.account_id, "editor-9");
        assert_eq!(version.when.as_deref(), Some("2024-03-05T10:00:00.000Z"));
        assert_eq!(page.links.webui, "/spaces/OPS/pages/101");
    }

    #[test]
    fn test_current_version_author_falls_back_to_page_author() {
        let mut page = current_page("1", "t");
        page["version"] = json!({ "number": 1 });

        let normalized = normalize_page(&page).unwrap();

        let version = normalized.version.unwrap();
        assert_eq!(version.by.account_id, "author-1");
        assert_eq!(version.when.as_deref(), Some("2024-03-01T10:00:00.000Z"));
    }

    #[test]
    fn test_current_page_without_version() {
        let mut page = current_page("1", "No version");
        page.as_object_mut().unwrap().remove("version");
        let payload = json!({ "results": [page] });

        let normalized = normalize_with_report(&payload, None).unwrap();

        assert!(normalized.fallbacks.is_empty());
        assert_eq!(normalized.result.results[0].version, None);
    }

    #[test]
    fn test_normalize_legacy_generation() {
        let result = normalize(&legacy_payload(), None).unwrap();

        assert_eq!(
            result.pagination,
            Pagination::Offset {
                start: 25,
                limit: 25,
                size: 1
            }
        );
        assert_eq!(result.links.context.as_deref(), Some("/wiki"));

        let page = &result.results[0];
        assert_eq!(page.space_id, "33");
        assert_eq!(page.space_label(), "OPS");
        assert_eq!(page.author_id.as_deref(), Some("legacy-author"));
        let version = page.version.as_ref().unwrap();
        assert_eq!(version.by.display_name, "Old Timer");
        assert_eq!(version.minor_edit, Some(true));
    }

    #[test]
    fn test_strict_failure_falls_back_to_flexible_parse() {
        // Arrange: current-generation page missing its links and with a numeric title
        let payload = json!({
            "results": [{
                "id": 301,
                "spaceId": 5,
                "title": 2024,
                "version": { "number": 2, "authorId": "a-1" }
            }]
        });

        // Act
        let normalized = normalize_with_report(&payload, None).unwrap();

        // Assert
        assert_eq!(normalized.fallbacks.len(), 1);
        assert!(normalized.fallbacks[0].starts_with("result 0 (id 301)"));
        let page = &normalized.result.results[0];
        assert_eq!(page.id, "301");
        assert_eq!(page.title, "2024");
        assert_eq!(page.space_id, "5");
        assert_eq!(page.status, "current");
        assert_eq!(page.links.webui, "");
        assert_eq!(page.version.as_ref().unwrap().by.account_id, "a-1");
    }

    #[test]
    fn test_unrecognized_shape_is_flexible() {
        let payload = json!({ "results": [{ "id": "9", "title": "Bare" }] });

        let normalized = normalize_with_report(&payload, None).unwrap();

        assert_eq!(normalized.fallbacks.len(), 1);
        let page = &normalized.result.results[0];
        assert_eq!(page.title, "Bare");
        assert_eq!(page.space, None);
        assert_eq!(page.version, None);
    }

    #[test]
    fn test_results_must_be_array_of_objects() {
        let err = normalize(&json!({ "results": "nope" }), None).unwrap_err();
        assert!(matches!(err, SearchError::SchemaMismatch { .. }));

        let err = normalize(&json!({ "results": [1, 2] }), None).unwrap_err();
        assert!(matches!(err, SearchError::SchemaMismatch { .. }));

        let err = normalize(&json!({}), None).unwrap_err();
        assert!(matches!(err, SearchError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_empty_results_use_hint() {
        let payload = json!({ "results": [], "_links": {} });

        let current = normalize(&payload, Some(Generation::Current)).unwrap();
        assert_eq!(current.pagination, Pagination::Cursor { next: None });

        let legacy = normalize(&payload, None).unwrap();
        assert_eq!(
            legacy.pagination,
            Pagination::Offset {
                start: 0,
                limit: 0,
                size: 0
            }
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for payload in [current_payload(), legacy_payload()] {
            let first = normalize(&payload, None).unwrap();
            let second = normalize(&payload, None).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_legacy_round_trip() {
        // Arrange
        let payload = legacy_payload();
        let original = &payload["results"][0];

        // Act
        let page = &normalize(&payload, None).unwrap().results[0];
        let record = serde_json::to_value(to_legacy_page(page)).unwrap();

        // Assert
        assert_eq!(record["title"], original["title"]);
        assert_eq!(record["_links"]["webui"], original["_links"]["webui"]);
        assert_eq!(record["version"]["number"], original["version"]["number"]);
        assert_eq!(
            record["version"]["by"]["accountId"],
            original["version"]["by"]["accountId"]
        );
        assert_eq!(record["space"]["key"], "OPS");
    }

    #[test]
    fn test_to_current_page() {
        let page = &normalize(&legacy_payload(), None).unwrap().results[0];

        let record = to_current_page(page);

        assert_eq!(record.space_id, "33");
        assert_eq!(record.author_id.as_deref(), Some("legacy-author"));
        assert_eq!(record.created_at.as_deref(), Some("2023-12-01T09:00:00.000Z"));
        assert_eq!(record.parent_type.as_deref(), Some("page"));
        assert_eq!(
            record.links.editui.as_deref(),
            Some("https://example.atlassian.net/wiki/rest/api/content/2001")
        );
        let version = record.version.unwrap();
        assert_eq!(version.number, 7);
        assert_eq!(version.author_id.as_deref(), Some("legacy-author"));
    }

    #[test]
    fn test_current_record_reparses_strictly() {
        let page = &normalize(&current_payload(), None).unwrap().results[0];

        let value = serde_json::to_value(to_current_page(page)).unwrap();
        let (raw, fallback) = RawPage::parse(&value).unwrap();

        assert_eq!(fallback, None);
        assert_eq!(&raw.into_page(), page);
    }
}
