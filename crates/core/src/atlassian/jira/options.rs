//! Issue search arguments and their validated form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::team::{TeamClause, TeamDirectory};
use crate::error::{SearchError, ValidationError};
use crate::validate;

pub const DEFAULT_MAX_RESULTS: u32 = 50;
pub const MAX_RESULTS_LIMIT: u32 = 100;

/// Status filter: one value compiles to `=`, several to `IN (...)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusFilter {
    Single(String),
    Many(Vec<String>),
}

/// Raw issue search arguments as they arrive from a tool call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchArgs {
    pub assignee: Option<String>,
    pub creator: Option<String>,
    pub team: Option<String>,
    pub team_identifier: Option<String>,
    pub project: Option<String>,
    pub status: Option<StatusFilter>,
    pub created_after: Option<String>,
    pub created_before: Option<String>,
    pub updated_after: Option<String>,
    pub updated_before: Option<String>,
    pub text_search: Option<String>,
    pub summary_search: Option<String>,
    pub description_search: Option<String>,
    pub text_search_terms: Option<Vec<String>>,
    pub summary_terms: Option<Vec<String>>,
    pub description_terms: Option<Vec<String>>,
    pub max_results: Option<i64>,
    pub start_at: Option<i64>,
}

/// Inclusive date bounds for one date field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub after: Option<String>,
    pub before: Option<String>,
}

/// Text terms per target. Single-string and list forms are merged, the
/// single-string term first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFilters {
    pub text: Vec<String>,
    pub summary: Vec<String>,
    pub description: Vec<String>,
}

/// Validated issue search options. Pagination is always populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueSearchOptions {
    pub assignee: Option<String>,
    pub creator: Option<String>,
    pub team: Option<TeamClause>,
    pub project: Option<String>,
    pub status: Option<StatusFilter>,
    pub created: DateRange,
    pub updated: DateRange,
    pub text: TextFilters,
    pub max_results: u32,
    pub start_at: u32,
}

impl Default for IssueSearchOptions {
    fn default() -> Self {
        Self {
            assignee: None,
            creator: None,
            team: None,
            project: None,
            status: None,
            created: DateRange::default(),
            updated: DateRange::default(),
            text: TextFilters::default(),
            max_results: DEFAULT_MAX_RESULTS,
            start_at: 0,
        }
    }
}

fn merged_terms(single: Option<String>, list: Option<Vec<String>>) -> Vec<String> {
    validate::present(single)
        .into_iter()
        .chain(validate::terms(list))
        .collect()
}

fn status_filter(status: Option<StatusFilter>) -> Option<StatusFilter> {
    match status? {
        StatusFilter::Single(s) => validate::present(Some(s)).map(StatusFilter::Single),
        StatusFilter::Many(list) => {
            let list = validate::terms(Some(list));
            if list.is_empty() {
                None
            } else {
                Some(StatusFilter::Many(list))
            }
        }
    }
}

impl SearchArgs {
    /// Parse a raw argument bag.
    pub fn from_value(arguments: Value) -> Result<Self, ValidationError> {
        validate::parse_args(arguments)
    }

    /// Tickets assigned to someone, optionally bounded by creation date.
    pub fn by_assignee(
        assignee: impl Into<String>,
        created_after: Option<String>,
        created_before: Option<String>,
        max_results: Option<i64>,
    ) -> Self {
        Self {
            assignee: Some(assignee.into()),
            created_after,
            created_before,
            max_results,
            ..Default::default()
        }
    }

    /// Tickets created by someone, optionally bounded by creation date.
    pub fn by_creator(
        creator: impl Into<String>,
        created_after: Option<String>,
        created_before: Option<String>,
        max_results: Option<i64>,
    ) -> Self {
        Self {
            creator: Some(creator.into()),
            created_after,
            created_before,
            max_results,
            ..Default::default()
        }
    }

    /// Tickets created inside `[start, end]`.
    pub fn in_timeframe(
        start: impl Into<String>,
        end: impl Into<String>,
        max_results: Option<i64>,
    ) -> Self {
        Self {
            created_after: Some(start.into()),
            created_before: Some(end.into()),
            max_results,
            ..Default::default()
        }
    }

    /// Validate, apply defaults and resolve the team against `teams`.
    ///
    /// Validation problems are reported before team resolution, and neither
    /// ever reaches the upstream.
    pub fn validate(self, teams: &TeamDirectory) -> Result<IssueSearchOptions, SearchError> {
        let max_results = validate::bounded(
            "maxResults",
            self.max_results,
            DEFAULT_MAX_RESULTS,
            1,
            MAX_RESULTS_LIMIT,
        )?;
        let start_at = validate::offset("startAt", self.start_at)?;

        let created = DateRange {
            after: validate::date("createdAfter", self.created_after)?,
            before: validate::date("createdBefore", self.created_before)?,
        };
        let updated = DateRange {
            after: validate::date("updatedAfter", self.updated_after)?,
            before: validate::date("updatedBefore", self.updated_before)?,
        };

        let team_name = validate::present(self.team);
        let team_identifier = validate::present(self.team_identifier);
        let team = match (team_name, team_identifier) {
            (Some(_), Some(_)) => {
                return Err(ValidationError::new(
                    "team",
                    "provide either team or teamIdentifier, not both",
                )
                .into())
            }
            (Some(name), None) => Some(teams.resolve(&name)?),
            (None, Some(identifier)) => Some(teams.clause(identifier.trim())),
            (None, None) => None,
        };

        Ok(IssueSearchOptions {
            assignee: validate::present(self.assignee),
            creator: validate::present(self.creator),
            team,
            project: validate::present(self.project),
            status: status_filter(self.status),
            created,
            updated,
            text: TextFilters {
                text: merged_terms(self.text_search, self.text_search_terms),
                summary: merged_terms(self.summary_search, self.summary_terms),
                description: merged_terms(self.description_search, self.description_terms),
            },
            max_results,
            start_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_applied_at_validation() {
        let options = SearchArgs::default()
            .validate(&TeamDirectory::default())
            .unwrap();

        assert_eq!(options.max_results, 50);
        assert_eq!(options.start_at, 0);
        assert_eq!(options, IssueSearchOptions::default());
    }

    #[test]
    fn test_max_results_bounds() {
        let teams = TeamDirectory::default();
        for (value, ok) in [(0, false), (1, true), (100, true), (101, false)] {
            let args = SearchArgs {
                max_results: Some(value),
                ..Default::default()
            };
            let result = args.validate(&teams);
            assert_eq!(result.is_ok(), ok, "maxResults={value}");
            if let Err(err) = result {
                assert!(matches!(err, SearchError::Validation(_)));
            }
        }
    }

    #[test]
    fn test_negative_start_at_rejected() {
        let args = SearchArgs {
            start_at: Some(-5),
            ..Default::default()
        };

        let err = args.validate(&TeamDirectory::default()).unwrap_err();

        assert!(matches!(err, SearchError::Validation(ref v) if v.field == "startAt"));
    }

    #[test]
    fn test_status_union_from_json() {
        let single = SearchArgs::from_value(json!({ "status": "Done" })).unwrap();
        assert_eq!(single.status, Some(StatusFilter::Single("Done".to_string())));

        let many = SearchArgs::from_value(json!({ "status": ["To Do", "In Progress"] })).unwrap();
        assert_eq!(
            many.status,
            Some(StatusFilter::Many(vec![
                "To Do".to_string(),
                "In Progress".to_string()
            ]))
        );
    }

    #[test]
    fn test_from_value_rejects_wrong_types() {
        let err = SearchArgs::from_value(json!({ "maxResults": "lots" })).unwrap_err();

        assert_eq!(err.field, "arguments");
    }

    #[test]
    fn test_from_value_null_is_empty() {
        assert_eq!(SearchArgs::from_value(Value::Null).unwrap(), SearchArgs::default());
    }

    #[test]
    fn test_empty_strings_count_as_absent() {
        let args = SearchArgs {
            assignee: Some(String::new()),
            status: Some(StatusFilter::Many(vec![])),
            ..Default::default()
        };

        let options = args.validate(&TeamDirectory::default()).unwrap();

        assert_eq!(options.assignee, None);
        assert_eq!(options.status, None);
    }

    #[test]
    fn test_malformed_date_rejected() {
        let args = SearchArgs::in_timeframe("2024-01-01", "yesterday", None);

        let err = args.validate(&TeamDirectory::default()).unwrap_err();

        assert!(matches!(err, SearchError::Validation(ref v) if v.field == "createdBefore"));
    }

    #[test]
    fn test_text_terms_merge_single_then_list() {
        let args = SearchArgs {
            summary_search: Some("login".to_string()),
            summary_terms: Some(vec!["oauth".to_string(), "sso".to_string()]),
            ..Default::default()
        };

        let options = args.validate(&TeamDirectory::default()).unwrap();

        assert_eq!(options.text.summary, vec!["login", "oauth", "sso"]);
    }

    #[test]
    fn test_team_resolved_through_directory() {
        let teams = TeamDirectory::new([("devops", "team-42")]);
        let args = SearchArgs {
            team: Some("DevOps".to_string()),
            ..Default::default()
        };

        let options = args.validate(&teams).unwrap();

        assert_eq!(
            options.team,
            Some(TeamClause {
                field: "Team[Team]".to_string(),
                identifier: "team-42".to_string()
            })
        );
    }

    #[test]
    fn test_unknown_team_is_reported() {
        let teams = TeamDirectory::new([("devops", "team-42")]);
        let args = SearchArgs {
            team: Some("marketing".to_string()),
            ..Default::default()
        };

        let err = args.validate(&teams).unwrap_err();

        assert!(matches!(err, SearchError::UnknownTeam { .. }));
    }

    #[test]
    fn test_team_and_identifier_conflict() {
        let args = SearchArgs {
            team: Some("devops".to_string()),
            team_identifier: Some("team-1".to_string()),
            ..Default::default()
        };

        let err = args.validate(&TeamDirectory::default()).unwrap_err();

        assert!(matches!(err, SearchError::Validation(ref v) if v.field == "team"));
    }

    #[test]
    fn test_presets() {
        let args = SearchArgs::by_creator("dev@example.com", None, None, Some(10));
        assert_eq!(args.creator.as_deref(), Some("dev@example.com"));
        assert_eq!(args.max_results, Some(10));

        let args = SearchArgs::by_assignee("dev@example.com", Some("2024-01-01".into()), None, None);
        assert_eq!(args.assignee.as_deref(), Some("dev@example.com"));
        assert_eq!(args.created_after.as_deref(), Some("2024-01-01"));
    }
}
