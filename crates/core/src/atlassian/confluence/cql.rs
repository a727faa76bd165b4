//! CQL construction from validated content search options.

use super::options::ContentSearchOptions;
use crate::atlassian::query::{and, condition};

/// Build a CQL query string: optional text condition, the resolved space
/// (whenever one exists) and the content type, always last.
pub fn build_cql(options: &ContentSearchOptions, default_space: &str) -> String {
    let mut conditions = Vec::new();

    let query = options.query.trim();
    if !query.is_empty() {
        conditions.push(condition("text", "~", query));
    }
    if let Some(space) = options.resolve_space(default_space) {
        conditions.push(condition("space.key", "=", space));
    }
    conditions.push(condition("type", "=", options.content_type.as_str()));

    and(&conditions)
}
