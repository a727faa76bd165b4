//! Error taxonomy shared by the Jira and Confluence search paths.
//!
//! Every error the core can produce is a plain value: validation failures never
//! leave the process, upstream failures carry the HTTP status and the best
//! human message we could extract from the error body.

use serde_json::Value;

/// Malformed or out-of-range input, detected before any upstream call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Upstream Atlassian product that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Jira,
    Confluence,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Service::Jira => write!(f, "Jira"),
            Service::Confluence => write!(f, "Confluence"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unknown team '{name}'. Known teams: {}", known_list(.known))]
    UnknownTeam { name: String, known: Vec<String> },

    #[error("{service} API error: {status} - {message}")]
    Upstream {
        service: Service,
        status: u16,
        message: String,
    },

    #[error("{service} request failed: {message}")]
    Transport { service: Service, message: String },

    #[error("Unexpected {service} response shape: {message}")]
    SchemaMismatch { service: Service, message: String },
}

fn known_list(known: &[String]) -> String {
    if known.is_empty() {
        "(none configured)".to_string()
    } else {
        known.join(", ")
    }
}

impl SearchError {
    /// Build an [`SearchError::Upstream`] from a non-2xx status and its body.
    ///
    /// `fallback` is used when the body carries nothing readable, usually the
    /// transport's own description of the failure.
    pub fn upstream(service: Service, status: u16, body: &Value, fallback: &str) -> Self {
        SearchError::Upstream {
            service,
            status,
            message: upstream_message(body).unwrap_or_else(|| fallback.to_string()),
        }
    }

    /// Whether the error was raised locally, before any upstream call.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            SearchError::Validation(_) | SearchError::UnknownTeam { .. }
        )
    }
}

/// Extract the most useful message from an Atlassian error body.
///
/// Preference order: the `errorMessages` array joined with ", ", then a
/// `message` string, then the values of an `errors` object (Jira field errors),
/// then a bare string body.
pub fn upstream_message(body: &Value) -> Option<String> {
    let joined = body
        .get("errorMessages")
        .and_then(|m| m.as_array())
        .map(|messages| {
            messages
                .iter()
                .filter_map(|m| m.as_str())
                .filter(|m| !m.is_empty())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .filter(|joined| !joined.is_empty());

    if joined.is_some() {
        return joined;
    }

    if let Some(message) = body
        .get("message")
        .and_then(|m| m.as_str())
        .filter(|m| !m.is_empty())
    {
        return Some(message.to_string());
    }

    if let Some(errors) = body.get("errors").and_then(|e| e.as_object()) {
        let joined = errors
            .iter()
            .filter_map(|(field, m)| m.as_str().map(|m| format!("{field}: {m}")))
            .collect::<Vec<_>>()
            .join(", ");
        if !joined.is_empty() {
            return Some(joined);
        }
    }

    body.as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
