//! Canonical result envelope shared by issue and page searches.

use serde::{Deserialize, Serialize};

/// How the upstream paginates a result set.
///
/// Offset pagination comes straight from the upstream (`start`/`limit`/`size`
/// for Confluence, `startAt`/`maxResults` for Jira). Cursor pagination only
/// carries an opaque continuation link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "lowercase")]
pub enum Pagination {
    Offset { start: u64, limit: u64, size: u64 },
    Cursor {
        #[serde(skip_serializing_if = "Option::is_none")]
        next: Option<String>,
    },
}

/// Offset-style view over any [`Pagination`], used for echoing pagination back
/// to callers that only understand numeric windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OffsetWindow {
    pub start: u64,
    pub limit: u64,
    pub size: u64,
}

impl Pagination {
    /// Numeric window for this page of results.
    ///
    /// Cursor pagination has no upstream offsets, so the window is synthetic:
    /// `start = 0`, `limit = size = count`.
    pub fn window(&self, count: usize) -> OffsetWindow {
        match self {
            Pagination::Offset { start, limit, size } => OffsetWindow {
                start: *start,
                limit: *limit,
                size: *size,
            },
            Pagination::Cursor { .. } => OffsetWindow {
                start: 0,
                limit: count as u64,
                size: count as u64,
            },
        }
    }

    pub fn next_cursor(&self) -> Option<&str> {
        match self {
            Pagination::Cursor { next } => next.as_deref(),
            Pagination::Offset { .. } => None,
        }
    }
}

/// Context links returned alongside a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(rename = "self", skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
}

/// Normalized search result, identical in shape whichever upstream API
/// generation served the data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult<T> {
    pub results: Vec<T>,
    pub pagination: Pagination,
    /// Grand total across all pages, when the upstream reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(rename = "_links")]
    pub links: ResultLinks,
}

impl<T> SearchResult<T> {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn window(&self) -> OffsetWindow {
        self.pagination.window(self.results.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_window_is_passed_through() {
        let pagination = Pagination::Offset {
            start: 25,
            limit: 25,
            size: 3,
        };

        assert_eq!(
            pagination.window(3),
            OffsetWindow {
                start: 25,
                limit: 25,
                size: 3
            }
        );
        assert_eq!(pagination.next_cursor(), None);
    }

    #[test]
    fn test_cursor_window_is_synthetic() {
        let pagination = Pagination::Cursor {
            next: Some("/wiki/api/v2/pages?cursor=abc".to_string()),
        };

        assert_eq!(
            pagination.window(7),
            OffsetWindow {
                start: 0,
                limit: 7,
                size: 7
            }
        );
        assert_eq!(
            pagination.next_cursor(),
            Some("/wiki/api/v2/pages?cursor=abc")
        );
    }

    #[test]
    fn test_pagination_serializes_with_style_tag() {
        let cursor = serde_json::to_value(Pagination::Cursor { next: None }).unwrap();
        assert_eq!(cursor, serde_json::json!({ "style": "cursor" }));

        let offset = serde_json::to_value(Pagination::Offset {
            start: 0,
            limit: 50,
            size: 2,
        })
        .unwrap();
        assert_eq!(
            offset,
            serde_json::json!({ "style": "offset", "start": 0, "limit": 50, "size": 2 })
        );
    }
}
