//! Jira issue search: argument validation, JQL construction and response
//! transformation.

pub mod adf;
pub mod issue;
pub mod jql;
pub mod options;
pub mod team;

pub use adf::description_text;
pub use issue::{
    search_fields_param, transform_issue, transform_issue_search, validate_issue_key, Identity,
    Issue, IssueFields, SearchRequest, SEARCH_FIELDS,
};
pub use jql::{build_jql, FALLBACK_JQL};
pub use options::{IssueSearchOptions, SearchArgs, StatusFilter};
pub use team::{TeamClause, TeamDirectory, DEFAULT_TEAM_FIELD};
