use std::path::{Path, PathBuf};
use std::time::Duration;

use atlassian_mcp_core::atlassian::confluence::{Generation, DEFAULT_SPACE_KEY};
use atlassian_mcp_core::atlassian::jira::TeamDirectory;

use crate::error::Error;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Site credentials for one Atlassian product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Site root without a trailing slash, e.g. `https://acme.atlassian.net`.
    pub base_url: String,
    pub email: String,
    pub api_token: String,
}

/// Process configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct AtlassianConfig {
    pub jira: Credentials,
    pub confluence: Credentials,
    pub default_space: String,
    pub generation: Generation,
    pub timeout: Duration,
    pub teams: TeamDirectory,
}

impl AtlassianConfig {
    /// Load configuration from environment variables.
    ///
    /// `ATLASSIAN_BASE_URL`, `ATLASSIAN_EMAIL` and `ATLASSIAN_API_TOKEN` apply to
    /// both products. `JIRA_*` and `CONFLUENCE_*` variants override them per
    /// product.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let jira = credentials("JIRA", &var)?;
        let confluence = credentials("CONFLUENCE", &var)?;

        let generation = match var("CONFLUENCE_API_GENERATION") {
            Some(value) => value
                .parse::<Generation>()
                .map_err(|reason| Error::InvalidConfig {
                    name: "CONFLUENCE_API_GENERATION".to_string(),
                    reason,
                })?,
            None => Generation::Current,
        };

        let timeout = match var("ATLASSIAN_TIMEOUT_SECS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| Error::InvalidConfig {
                    name: "ATLASSIAN_TIMEOUT_SECS".to_string(),
                    reason: format!("'{value}' is not a positive number of seconds"),
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let teams = match var("ATLASSIAN_TEAMS_FILE") {
            Some(path) => load_teams(Path::new(path.trim()))?,
            None => TeamDirectory::default(),
        };

        Ok(Self {
            jira,
            confluence,
            default_space: var("CONFLUENCE_DEFAULT_SPACE")
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|| DEFAULT_SPACE_KEY.to_string()),
            generation,
            timeout: Duration::from_secs(timeout),
            teams,
        })
    }
}

fn credentials<F>(product: &str, var: &F) -> Result<Credentials, Error>
where
    F: Fn(&str) -> Option<String>,
{
    let pick = |suffix: &str| {
        let specific = format!("{product}_{suffix}");
        let shared = format!("ATLASSIAN_{suffix}");
        var(&specific)
            .or_else(|| var(&shared))
            .ok_or(Error::MissingEnv(shared))
    };

    Ok(Credentials {
        base_url: validate_base_url(&pick("BASE_URL")?)?,
        email: validate_email(&pick("EMAIL")?)?,
        api_token: pick("API_TOKEN")?.trim().to_string(),
    })
}

/// Require an absolute http(s) URL and drop trailing slashes.
pub fn validate_base_url(value: &str) -> Result<String, Error> {
    let invalid = |reason: String| Error::InvalidConfig {
        name: "base URL".to_string(),
        reason,
    };

    let trimmed = value.trim().trim_end_matches('/');
    let url = reqwest::Url::parse(trimmed).map_err(|e| invalid(format!("'{value}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid(format!("'{value}' is not an http(s) URL")));
    }
    Ok(trimmed.to_string())
}

pub fn validate_email(value: &str) -> Result<String, Error> {
    let value = value.trim();
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if valid {
        Ok(value.to_string())
    } else {
        Err(Error::InvalidConfig {
            name: "email".to_string(),
            reason: format!("'{value}' is not an email address"),
        })
    }
}

/// Read a team directory from a TOML file.
pub fn load_teams(path: &Path) -> Result<TeamDirectory, Error> {
    let teams_file = |reason: String| Error::TeamsFile {
        path: PathBuf::from(path),
        reason,
    };
    let source = std::fs::read_to_string(path).map_err(|e| teams_file(e.to_string()))?;
    TeamDirectory::from_toml_str(&source).map_err(|e| teams_file(e.to_string()))
}
