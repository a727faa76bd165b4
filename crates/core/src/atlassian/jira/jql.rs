//! JQL construction from validated issue search options.

use super::options::{IssueSearchOptions, StatusFilter, TextFilters};
use crate::atlassian::query::{and, any_of, condition, quote};

/// Query used when no filter produced a condition.
pub const FALLBACK_JQL: &str = "order by created DESC";

/// Build a JQL query string.
///
/// Conditions are emitted in a fixed order and joined with `AND`: assignee,
/// creator, team, project, status, created range, updated range, then text
/// filters. With no conditions at all the query is [`FALLBACK_JQL`].
pub fn build_jql(options: &IssueSearchOptions) -> String {
    let mut conditions = Vec::new();

    if let Some(assignee) = &options.assignee {
        conditions.push(condition("assignee", "=", assignee));
    }
    if let Some(creator) = &options.creator {
        conditions.push(condition("creator", "=", creator));
    }
    if let Some(team) = &options.team {
        conditions.push(format!("{} = {}", quote(&team.field), quote(&team.identifier)));
    }
    if let Some(project) = &options.project {
        conditions.push(condition("project", "=", project));
    }
    if let Some(status) = &options.status {
        conditions.push(status_condition(status));
    }

    for (field, range) in [("created", &options.created), ("updated", &options.updated)] {
        if let Some(after) = &range.after {
            conditions.push(condition(field, ">=", after));
        }
        if let Some(before) = &range.before {
            conditions.push(condition(field, "<=", before));
        }
    }

    conditions.extend(text_conditions(&options.text));

    if conditions.is_empty() {
        FALLBACK_JQL.to_string()
    } else {
        and(&conditions)
    }
}

fn status_condition(status: &StatusFilter) -> String {
    match status {
        StatusFilter::Single(value) => condition("status", "=", value),
        StatusFilter::Many(values) => {
            let quoted = values.iter().map(|v| quote(v)).collect::<Vec<_>>();
            format!("status IN ({})", quoted.join(", "))
        }
    }
}

/// Free-text terms match summary and description unless a field has its own
/// filter, in which case the free text leaves that field alone. When both
/// fields are taken, free text falls back to the `text` pseudo-field.
fn text_conditions(text: &TextFilters) -> Vec<String> {
    let mut conditions = Vec::new();

    if !text.text.is_empty() {
        let mut targets = Vec::new();
        if text.summary.is_empty() {
            targets.push("summary");
        }
        if text.description.is_empty() {
            targets.push("description");
        }
        if targets.is_empty() {
            targets.push("text");
        }

        let group = text
            .text
            .iter()
            .flat_map(|term| targets.iter().map(move |field| condition(field, "~", term)))
            .collect();
        conditions.extend(any_of(group));
    }

    for (field, terms) in [("summary", &text.summary), ("description", &text.description)] {
        let group = terms
            .iter()
            .map(|term| condition(field, "~", term))
            .collect();
        conditions.extend(any_of(group));
    }

    conditions
}
