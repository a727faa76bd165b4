//! Friendly team names mapped to Jira team identifiers.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::SearchError;

/// Default JQL field used to filter issues by team.
pub const DEFAULT_TEAM_FIELD: &str = "Team[Team]";

/// Static mapping of team names to the identifiers Jira stores in its team
/// field. Built once from configuration and handed to the issue search at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TeamDirectory {
    #[serde(default = "default_field")]
    pub field: String,
    #[serde(default)]
    pub teams: BTreeMap<String, String>,
}

fn default_field() -> String {
    DEFAULT_TEAM_FIELD.to_string()
}

impl Default for TeamDirectory {
    fn default() -> Self {
        Self {
            field: default_field(),
            teams: BTreeMap::new(),
        }
    }
}

/// The team condition to add to a JQL query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamClause {
    pub field: String,
    pub identifier: String,
}

impl TeamDirectory {
    pub fn new<I, K, V>(teams: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            field: default_field(),
            teams: teams
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse a directory from TOML:
    ///
    /// ```toml
    /// field = "Team[Team]"
    ///
    /// [teams]
    /// devops = "5f1c9a52-0e3b-4a8e-9d55-3c2b1f0a7e61"
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Known team names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.teams.keys().cloned().collect()
    }

    /// Look a team up by name, ignoring ASCII case.
    pub fn resolve(&self, name: &str) -> Result<TeamClause, SearchError> {
        let name = name.trim();
        self.teams
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|(_, identifier)| self.clause(identifier))
            .ok_or_else(|| SearchError::UnknownTeam {
                name: name.to_string(),
                known: self.names(),
            })
    }

    /// Build a clause for an identifier supplied directly by the caller.
    pub fn clause(&self, identifier: &str) -> TeamClause {
        TeamClause {
            field: self.field.clone(),
            identifier: identifier.to_string(),
        }
    }
}
