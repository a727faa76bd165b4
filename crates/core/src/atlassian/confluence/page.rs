//! Canonical Confluence page, identical whichever API generation served it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::options::ContentType;

/// Space reference. Current-generation payloads only carry the space id, so
/// `key` and `name` stay empty for them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceRef {
    pub id: String,
    pub key: String,
    pub name: String,
}

/// Author of a page version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionAuthor {
    pub account_id: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageVersion {
    pub number: u64,
    /// When the version was created. Legacy `when`, current `createdAt`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
    pub by: VersionAuthor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor_edit: Option<bool>,
}

/// Page links. `webui` is always present, the rest only when the upstream
/// sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
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

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub status: String,
    pub title: String,
    pub space_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<SpaceRef>,
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
    pub version: Option<PageVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(rename = "_links")]
    pub links: PageLinks,
}

impl Page {
    /// Raw body text across every representation the upstream returned
    /// (`storage`, `atlas_doc_format`, `view`...).
    pub fn body_text(&self) -> String {
        let Some(body) = self.body.as_ref().and_then(Value::as_object) else {
            return String::new();
        };
        body.values()
            .filter_map(|repr| repr.get("value").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Case-insensitive substring match over title and body. An empty needle
    /// matches everything.
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self.body_text().to_lowercase().contains(&needle)
    }

    pub fn is_type(&self, content_type: ContentType) -> bool {
        self.content_type.eq_ignore_ascii_case(content_type.as_str())
    }

    pub fn space_label(&self) -> &str {
        match &self.space {
            Some(space) if !space.key.is_empty() => &space.key,
            _ => &self.space_id,
        }
    }
}
