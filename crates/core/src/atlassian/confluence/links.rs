//! Links-only projection of a page search.

use serde::Serialize;

use super::page::Page;
use crate::search::SearchResult;

/// Absolute page links for one page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinksOnlyResult {
    pub links: Vec<String>,
    /// Links in this page of results, not a grand total.
    pub total: usize,
    pub start: u64,
    pub limit: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// The base a page's `webui` path is relative to: the one the response
/// carried, else `fallback_base`.
pub fn link_base<'a>(result: &'a SearchResult<Page>, fallback_base: &'a str) -> &'a str {
    result
        .links
        .base
        .as_deref()
        .filter(|b| !b.is_empty())
        .unwrap_or(fallback_base)
        .trim_end_matches('/')
}

/// `base + webui` for every result, in result order. Duplicates are kept.
pub fn project_links(result: &SearchResult<Page>, fallback_base: &str) -> Vec<String> {
    let base = link_base(result, fallback_base);
    result
        .results
        .iter()
        .map(|page| format!("{base}{}", page.links.webui))
        .collect()
}

/// Project a result to [`LinksOnlyResult`], echoing its pagination.
pub fn links_only(result: &SearchResult<Page>, fallback_base: &str) -> LinksOnlyResult {
    let links = project_links(result, fallback_base);
    let window = result.window();
    LinksOnlyResult {
        total: links.len(),
        links,
        start: window.start,
        limit: window.limit,
        next: result.pagination.next_cursor().map(str::to_string),
    }
}
