mod atlassian;

use atlassian_mcp_core::error::SearchError;
use serde::{Deserialize, Serialize};

use crate::http::HttpClient;

// Re-export types needed by tool handlers
pub use super::{JsonRpcError, Server, Tool};

// MCP Protocol types for tools
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
pub struct ToolsCapability {}

#[derive(Debug, Serialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ToolsList {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
}

/// Why a tool call failed. Reported to the client as an error result, never as
/// a protocol error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("{0}")]
    Search(#[from] SearchError),

    #[error("{0}")]
    NotConfigured(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn internal_error(e: serde_json::Error) -> JsonRpcError {
    JsonRpcError {
        code: -32603,
        message: format!("Internal error: {e}"),
        data: None,
    }
}

/// Wrap a tool outcome in an MCP result: pretty JSON on success,
/// `Error: <message>` with `isError` on failure.
pub fn tool_result<T: Serialize>(
    tool: &str,
    outcome: Result<T, ToolError>,
) -> Result<serde_json::Value, JsonRpcError> {
    let outcome = outcome.and_then(|data| Ok(serde_json::to_string_pretty(&data)?));

    let result = match outcome {
        Ok(text) => CallToolResult {
            content: vec![Content::Text { text }],
            is_error: None,
        },
        Err(e) => {
            match &e {
                ToolError::Search(search) if search.is_local() => {
                    log::debug!("{tool} rejected its arguments: {e}");
                }
                _ => log::error!("{tool} failed: {e}"),
            }
            CallToolResult {
                content: vec![Content::Text {
                    text: format!("Error: {e}"),
                }],
                is_error: Some(true),
            }
        }
    };

    serde_json::to_value(result).map_err(internal_error)
}

pub fn handle_initialize<J, C>(server: &Server<J, C>) -> Result<serde_json::Value, JsonRpcError> {
    let result = InitializeResult {
        protocol_version: "2024-11-05".to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {}),
        },
        server_info: ServerInfo {
            name: server.name.clone(),
            version: server.version.clone(),
        },
    };

    serde_json::to_value(result).map_err(internal_error)
}

fn date_range_properties() -> serde_json::Value {
    serde_json::json!({
        "createdAfter": {
            "type": "string",
            "description": "ISO date (YYYY-MM-DD or RFC 3339) for tickets created on or after this date"
        },
        "createdBefore": {
            "type": "string",
            "description": "ISO date (YYYY-MM-DD or RFC 3339) for tickets created on or before this date"
        },
        "maxResults": {
            "type": "number",
            "description": "Maximum number of results (1-100, default: 50)"
        }
    })
}

fn with_properties(mut base: serde_json::Value, extra: serde_json::Value) -> serde_json::Value {
    if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
        base.extend(extra.clone());
    }
    base
}

pub fn handle_tools_list() -> Result<serde_json::Value, JsonRpcError> {
    let term_list = |description: &str| {
        serde_json::json!({
            "type": "array",
            "items": { "type": "string" },
            "description": description
        })
    };

    let tools = vec![
        Tool {
            name: "search_jira_tickets".to_string(),
            description: "Search Jira tickets with structured filters (assignee, creator, team, project, status, created/updated dates, free text). Filters are combined with AND; multiple terms for the same text field are combined with OR. Returns tickets with key, summary, status, people and dates plus offset pagination. Without any filter, returns the most recently created tickets.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "assignee": { "type": "string", "description": "Email or account id of the assignee" },
                    "creator": { "type": "string", "description": "Email or account id of the creator" },
                    "team": { "type": "string", "description": "Team name, resolved through the configured team directory" },
                    "teamIdentifier": { "type": "string", "description": "Raw team identifier (use instead of team)" },
                    "project": { "type": "string", "description": "Project key" },
                    "status": {
                        "oneOf": [
                            { "type": "string" },
                            { "type": "array", "items": { "type": "string" } }
                        ],
                        "description": "Ticket status, or a list of statuses to match any of"
                    },
                    "createdAfter": { "type": "string", "description": "ISO date for tickets created on or after this date" },
                    "createdBefore": { "type": "string", "description": "ISO date for tickets created on or before this date" },
                    "updatedAfter": { "type": "string", "description": "ISO date for tickets updated on or after this date" },
                    "updatedBefore": { "type": "string", "description": "ISO date for tickets updated on or before this date" },
                    "textSearch": { "type": "string", "description": "Text matched against summary and description" },
                    "summarySearch": { "type": "string", "description": "Text matched against the summary only" },
                    "descriptionSearch": { "type": "string", "description": "Text matched against the description only" },
                    "textSearchTerms": term_list("Terms matched against summary and description, any of them"),
                    "summaryTerms": term_list("Terms matched against the summary, any of them"),
                    "descriptionTerms": term_list("Terms matched against the description, any of them"),
                    "maxResults": { "type": "number", "description": "Maximum number of results (1-100, default: 50)" },
                    "startAt": { "type": "number", "description": "Index of the first result for pagination (default: 0)" }
                }
            }),
        },
        Tool {
            name: "get_jira_tickets_by_assignee".to_string(),
            description: "Get Jira tickets assigned to a specific user, optionally bounded by creation date.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": with_properties(
                    serde_json::json!({
                        "assigneeEmail": { "type": "string", "description": "Email of the assignee" }
                    }),
                    date_range_properties()
                ),
                "required": ["assigneeEmail"]
            }),
        },
        Tool {
            name: "get_jira_tickets_by_creator".to_string(),
            description: "Get Jira tickets created by a specific user, optionally bounded by creation date.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": with_properties(
                    serde_json::json!({
                        "creatorEmail": { "type": "string", "description": "Email of the creator" }
                    }),
                    date_range_properties()
                ),
                "required": ["creatorEmail"]
            }),
        },
        Tool {
            name: "get_jira_tickets_in_timeframe".to_string(),
            description: "Get Jira tickets created within a time frame (both ends inclusive).".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "startDate": { "type": "string", "description": "ISO date for the start of the time frame" },
                    "endDate": { "type": "string", "description": "ISO date for the end of the time frame" },
                    "maxResults": { "type": "number", "description": "Maximum number of results (1-100, default: 50)" }
                },
                "required": ["startDate", "endDate"]
            }),
        },
        Tool {
            name: "get_jira_ticket".to_string(),
            description: "Get a single Jira ticket by key (e.g., 'PROJ-123') with its rendered fields.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "issueKey": { "type": "string", "description": "Issue key, e.g. PROJ-123" }
                },
                "required": ["issueKey"]
            }),
        },
        Tool {
            name: "search_confluence_pages".to_string(),
            description: "Search Confluence pages or blog posts by text, scoped to a space (the configured default space when none is given). An empty query matches every page in the space. Set outputFormat to 'links_only' to receive only absolute page URLs.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Text to search for in pages; may be empty" },
                    "spaceKey": { "type": "string", "description": "Space key to limit the search to" },
                    "type": {
                        "type": "string",
                        "enum": ["page", "blogpost"],
                        "description": "Type of content to search for (default: page)"
                    },
                    "outputFormat": {
                        "type": "string",
                        "enum": ["full", "links_only"],
                        "description": "Full page records or absolute links only (default: full)"
                    },
                    "limit": { "type": "number", "description": "Maximum number of results (1-100, default: 25)" },
                    "start": { "type": "number", "description": "Offset of the first result (v1 API only)" },
                    "cursor": { "type": "string", "description": "Cursor, or the previous result's next link (v2 API only)" }
                },
                "required": ["query"]
            }),
        },
        Tool {
            name: "get_confluence_page_links".to_string(),
            description: "Get absolute links to Confluence pages matching a text query.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Text to search for in pages" },
                    "spaceKey": { "type": "string", "description": "Space key to limit the search to" },
                    "limit": { "type": "number", "description": "Maximum number of results (1-100, default: 25)" }
                },
                "required": ["query"]
            }),
        },
        Tool {
            name: "get_confluence_page".to_string(),
            description: "Get a single Confluence page by id, including its storage-format body.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "pageId": { "type": "string", "description": "Page id" }
                },
                "required": ["pageId"]
            }),
        },
    ];

    let result = ToolsList { tools };

    serde_json::to_value(result).map_err(internal_error)
}

pub async fn handle_tools_call<J, C>(
    params: Option<serde_json::Value>,
    server: &Server<J, C>,
) -> Result<serde_json::Value, JsonRpcError>
where
    J: HttpClient,
    C: HttpClient,
{
    let params: CallToolParams = serde_json::from_value(params.unwrap_or(serde_json::Value::Null))
        .map_err(|e| JsonRpcError {
            code: -32602,
            message: format!("Invalid params: {e}"),
            data: None,
        })?;

    let arguments = params.arguments.unwrap_or(serde_json::Value::Null);
    match params.name.as_str() {
        "search_jira_tickets" => atlassian::handle_search_jira_tickets(arguments, server).await,
        "get_jira_tickets_by_assignee" => {
            atlassian::handle_get_jira_tickets_by_assignee(arguments, server).await
        }
        "get_jira_tickets_by_creator" => {
            atlassian::handle_get_jira_tickets_by_creator(arguments, server).await
        }
        "get_jira_tickets_in_timeframe" => {
            atlassian::handle_get_jira_tickets_in_timeframe(arguments, server).await
        }
        "get_jira_ticket" => atlassian::handle_get_jira_ticket(arguments, server).await,
        "search_confluence_pages" => {
            atlassian::handle_search_confluence_pages(arguments, server).await
        }
        "get_confluence_page_links" => {
            atlassian::handle_get_confluence_page_links(arguments, server).await
        }
        "get_confluence_page" => atlassian::handle_get_confluence_page(arguments, server).await,
        _ => Err(JsonRpcError {
            code: -32602,
            message: format!("Unknown tool: {}", params.name),
            data: None,
        }),
    }
}
