//! Canonical issue model and the transformation from Jira search responses.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{SearchError, Service, ValidationError};
use crate::search::{Pagination, ResultLinks, SearchResult};

/// Fields requested on every search and issue read.
pub const SEARCH_FIELDS: [&str; 11] = [
    "summary",
    "description",
    "status",
    "assignee",
    "creator",
    "reporter",
    "created",
    "updated",
    "priority",
    "issuetype",
    "project",
];

/// Comma-joined [`SEARCH_FIELDS`] for query-string use.
pub fn search_fields_param() -> String {
    SEARCH_FIELDS.join(",")
}

/// A person attached to an issue (assignee, creator, reporter).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
}

impl Identity {
    /// Display name, falling back to the email address and then the account id.
    pub fn label(&self) -> &str {
        if !self.display_name.is_empty() {
            &self.display_name
        } else if let Some(email) = self.email_address.as_deref().filter(|e| !e.is_empty()) {
            email
        } else {
            &self.account_id
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCategory {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueStatus {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status_category: StatusCategory,
}

/// Name/id pair used for priority and issue type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub name: String,
}

/// Issue fields. Anything older payloads may omit is optional or defaulted so
/// that a missing `creator` or `priority` never rejects the whole result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: String,
    /// Plain string or an ADF document, kept as delivered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(default)]
    pub status: IssueStatus,
    #[serde(default)]
    pub assignee: Option<Identity>,
    #[serde(default)]
    pub creator: Option<Identity>,
    #[serde(default)]
    pub reporter: Option<Identity>,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub updated: String,
    #[serde(default)]
    pub priority: Option<NamedRef>,
    #[serde(default)]
    pub issuetype: NamedRef,
    #[serde(default)]
    pub project: ProjectRef,
}

/// Canonical issue as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(default)]
    pub id: String,
    pub key: String,
    #[serde(rename = "self", default)]
    pub self_link: String,
    #[serde(default)]
    pub fields: IssueFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendered_fields: Option<Value>,
}

/// Search response from `POST /rest/api/3/search`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraSearchResponse {
    #[serde(default)]
    pub start_at: Option<u64>,
    #[serde(default)]
    pub max_results: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

/// Request body for the issue search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub jql: String,
    pub start_at: u32,
    pub max_results: u32,
    pub fields: Vec<String>,
    pub expand: Vec<String>,
}

impl SearchRequest {
    pub fn new(jql: String, start_at: u32, max_results: u32) -> Self {
        Self {
            jql,
            start_at,
            max_results,
            fields: SEARCH_FIELDS.iter().map(|f| f.to_string()).collect(),
            expand: vec!["renderedFields".to_string()],
        }
    }

    /// JSON body for `POST /rest/api/3/search`.
    pub fn into_body(self) -> Value {
        json!({
            "jql": self.jql,
            "startAt": self.start_at,
            "maxResults": self.max_results,
            "fields": self.fields,
            "expand": self.expand,
        })
    }
}

/// Parse a raw Jira search payload into the canonical result.
///
/// Offsets the upstream omits fall back to what was requested.
pub fn transform_issue_search(
    payload: Value,
    requested_start: u32,
    requested_limit: u32,
) -> Result<SearchResult<Issue>, SearchError> {
    let response: JiraSearchResponse =
        serde_json::from_value(payload).map_err(|e| SearchError::SchemaMismatch {
            service: Service::Jira,
            message: e.to_string(),
        })?;

    let size = response.issues.len() as u64;
    Ok(SearchResult {
        pagination: Pagination::Offset {
            start: response.start_at.unwrap_or(u64::from(requested_start)),
            limit: response.max_results.unwrap_or(u64::from(requested_limit)),
            size,
        },
        total: response.total,
        results: response.issues,
        links: ResultLinks::default(),
    })
}

/// Parse a single issue payload.
pub fn transform_issue(payload: Value) -> Result<Issue, SearchError> {
    serde_json::from_value(payload).map_err(|e| SearchError::SchemaMismatch {
        service: Service::Jira,
        message: e.to_string(),
    })
}

/// Check an issue key has the `PROJ-123` form and normalize it to upper case.
pub fn validate_issue_key(key: &str) -> Result<String, ValidationError> {
    let pattern = Regex::new(r"^[A-Za-z][A-Za-z0-9_]*-\d+$")
        .map_err(|e| ValidationError::new("key", e.to_string()))?;
    let key = key.trim();
    if pattern.is_match(key) {
        Ok(key.to_uppercase())
    } else {
        Err(ValidationError::new(
            "key",
            format!("'{key}' is not a valid issue key (expected e.g. PROJ-123)"),
        ))
    }
}
