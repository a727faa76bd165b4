//! Content search arguments and their validated form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::validate;

pub const DEFAULT_LIMIT: u32 = 25;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Page,
    Blogpost,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Page => "page",
            ContentType::Blogpost => "blogpost",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Full,
    LinksOnly,
}

/// Raw content search arguments as they arrive from a tool call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSearchArgs {
    pub query: Option<String>,
    pub space_key: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<ContentType>,
    pub output_format: Option<OutputFormat>,
    pub limit: Option<i64>,
    pub start: Option<i64>,
    pub cursor: Option<String>,
}

/// Where the next page of results starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    Offset(u32),
    Cursor(String),
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::Offset(0)
    }
}

/// Validated content search options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSearchOptions {
    /// Trimmed query text. Empty means "no text condition".
    pub query: String,
    pub space_key: Option<String>,
    pub content_type: ContentType,
    pub output_format: OutputFormat,
    pub limit: u32,
    pub page: PageRequest,
}

impl Default for ContentSearchOptions {
    fn default() -> Self {
        Self {
            query: String::new(),
            space_key: None,
            content_type: ContentType::Page,
            output_format: OutputFormat::Full,
            limit: DEFAULT_LIMIT,
            page: PageRequest::default(),
        }
    }
}

impl ContentSearchOptions {
    /// Resolve the effective space: the caller's space key, else the default.
    /// `None` when neither is a non-empty string.
    pub fn resolve_space<'a>(&'a self, default_space: &'a str) -> Option<&'a str> {
        self.space_key
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| Some(default_space.trim()).filter(|s| !s.is_empty()))
    }
}

impl ContentSearchArgs {
    pub fn from_value(arguments: Value) -> Result<Self, ValidationError> {
        validate::parse_args(arguments)
    }

    /// Links-only search over pages, as exposed by the page links tool.
    pub fn links(query: impl Into<String>, space_key: Option<String>, limit: Option<i64>) -> Self {
        Self {
            query: Some(query.into()),
            space_key,
            content_type: Some(ContentType::Page),
            output_format: Some(OutputFormat::LinksOnly),
            limit,
            ..Default::default()
        }
    }

    /// `query` must be present but may be empty. `start` and `cursor` are
    /// mutually exclusive.
    pub fn validate(self) -> Result<ContentSearchOptions, ValidationError> {
        let query = self
            .query
            .ok_or_else(|| ValidationError::new("query", "is required (may be empty)"))?;
        let limit = validate::bounded("limit", self.limit, DEFAULT_LIMIT, 1, MAX_LIMIT)?;

        let page = match (self.start, validate::present(self.cursor)) {
            (Some(_), Some(_)) => {
                return Err(ValidationError::new(
                    "cursor",
                    "provide either start or cursor, not both",
                ))
            }
            (_, Some(cursor)) => PageRequest::Cursor(cursor),
            (start, None) => PageRequest::Offset(validate::offset("start", start)?),
        };

        Ok(ContentSearchOptions {
            query: query.trim().to_string(),
            space_key: validate::present(self.space_key).map(|s| s.trim().to_string()),
            content_type: self.content_type.unwrap_or_default(),
            output_format: self.output_format.unwrap_or_default(),
            limit,
            page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = ContentSearchArgs::from_value(json!({ "query": "" }))
            .unwrap()
            .validate()
            .unwrap();

        assert_eq!(options, ContentSearchOptions::default());
    }

    #[test]
    fn test_query_is_required() {
        let err = ContentSearchArgs::default().validate().unwrap_err();

        assert_eq!(err.field, "query");
    }

    #[test]
    fn test_parses_enums() {
        let args = ContentSearchArgs::from_value(json!({
            "query": "kong",
            "type": "blogpost",
            "outputFormat": "links_only"
        }))
        .unwrap();

        assert_eq!(args.content_type, Some(ContentType::Blogpost));
        assert_eq!(args.output_format, Some(OutputFormat::LinksOnly));
    }

    #[test]
    fn test_rejects_unknown_type() {
        let err = ContentSearchArgs::from_value(json!({ "query": "x", "type": "comment" }))
            .unwrap_err();

        assert_eq!(err.field, "arguments");
    }

    #[test]
    fn test_limit_bounds() {
        for (limit, ok) in [(0, false), (1, true), (100, true), (101, false)] {
            let args = ContentSearchArgs {
                query: Some("x".to_string()),
                limit: Some(limit),
                ..Default::default()
            };
            assert_eq!(args.validate().is_ok(), ok, "limit={limit}");
        }
    }

    #[test]
    fn test_start_and_cursor_conflict() {
        let args = ContentSearchArgs {
            query: Some("x".to_string()),
            start: Some(25),
            cursor: Some("abc".to_string()),
            ..Default::default()
        };

        assert_eq!(args.validate().unwrap_err().field, "cursor");
    }

    #[test]
    fn test_cursor_request() {
        let args = ContentSearchArgs {
            query: Some("x".to_string()),
            cursor: Some("abc".to_string()),
            ..Default::default()
        };

        assert_eq!(
            args.validate().unwrap().page,
            PageRequest::Cursor("abc".to_string())
        );
    }

    #[test]
    fn test_resolve_space_prefers_caller() {
        let mut options = ContentSearchOptions::default();
        assert_eq!(options.resolve_space("DEVOPS"), Some("DEVOPS"));
        assert_eq!(options.resolve_space(""), None);

        options.space_key = Some("ENG".to_string());
        assert_eq!(options.resolve_space("DEVOPS"), Some("ENG"));
    }

    #[test]
    fn test_links_preset() {
        let options = ContentSearchArgs::links("kong", None, Some(5))
            .validate()
            .unwrap();

        assert_eq!(options.output_format, OutputFormat::LinksOnly);
        assert_eq!(options.limit, 5);
        assert_eq!(options.query, "kong");
    }
}
