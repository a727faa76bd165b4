mod cli;
mod stdio;
mod tools;

pub use cli::App;

use crate::atlassian::Searchers;
use crate::http::HttpClient;
use crate::prelude::*;
use serde::{Deserialize, Serialize};

// JSON-RPC 2.0 types
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<serde_json::Value>,
    method: String,
    params: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: String,
    id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

// MCP Protocol types
#[derive(Debug, Serialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// Everything a tool call needs: server identity and the two orchestrators.
///
/// Configuration problems do not stop the server. They are kept and reported
/// by every tool call instead.
pub struct Server<J, C> {
    pub name: String,
    pub version: String,
    pub verbose: bool,
    searchers: std::result::Result<Searchers<J, C>, String>,
}

impl<J, C> Server<J, C> {
    pub fn new(
        name: String,
        version: String,
        verbose: bool,
        searchers: std::result::Result<Searchers<J, C>, String>,
    ) -> Self {
        Self {
            name,
            version,
            verbose,
            searchers,
        }
    }

    pub fn searchers(&self) -> std::result::Result<&Searchers<J, C>, &str> {
        self.searchers.as_ref().map_err(String::as_str)
    }
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    match app.command {
        cli::Commands::Stdio(options) => stdio::run_stdio(options, global).await,
    }
}

/// Answer one JSON-RPC message. Notifications get no response.
pub async fn handle_request<J, C>(request_str: &str, server: &Server<J, C>) -> Option<JsonRpcResponse>
where
    J: HttpClient,
    C: HttpClient,
{
    let request: JsonRpcRequest = match serde_json::from_str(request_str) {
        Ok(req) => req,
        Err(e) => {
            return Some(JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                id: None,
                result: None,
                error: Some(JsonRpcError {
                    code: -32700,
                    message: format!("Parse error: {e}"),
                    data: None,
                }),
            });
        }
    };

    if request.id.is_none() && request.method.starts_with("notifications/") {
        log::debug!("Received notification {}", request.method);
        return None;
    }

    let result = match request.method.as_str() {
        "initialize" => tools::handle_initialize(server),
        "ping" => Ok(serde_json::json!({})),
        "tools/list" => tools::handle_tools_list(),
        "tools/call" => tools::handle_tools_call(request.params, server).await,
        method => Err(JsonRpcError {
            code: -32601,
            message: format!("Method not found: {method}"),
            data: None,
        }),
    };

    Some(match result {
        Ok(value) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id,
            result: Some(value),
            error: None,
        },
        Err(error) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id,
            result: None,
            error: Some(error),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlassian::{ConfluenceSearch, JiraSearch};
    use crate::http::mock::MockClient;
    use atlassian_mcp_core::atlassian::confluence::Generation;
    use atlassian_mcp_core::atlassian::jira::TeamDirectory;
    use serde_json::{json, Value};

    pub(crate) fn server(
        jira: Vec<std::result::Result<Value, crate::http::HttpError>>,
        confluence: Vec<std::result::Result<Value, crate::http::HttpError>>,
    ) -> Server<MockClient, MockClient> {
        Server::new(
            "Atlassian MCP Server".to_string(),
            "1.0.0".to_string(),
            false,
            Ok(Searchers {
                jira: JiraSearch::new(
                    MockClient::new(jira),
                    TeamDirectory::new([("devops", "team-1")]),
                ),
                confluence: ConfluenceSearch::new(
                    MockClient::new(confluence),
                    "https://acme.atlassian.net",
                    "DEVOPS".to_string(),
                    Generation::Current,
                ),
            }),
        )
    }

    async fn call(server: &Server<MockClient, MockClient>, request: Value) -> Value {
        let response = handle_request(&request.to_string(), server).await.unwrap();
        serde_json::to_value(response).unwrap()
    }

    #[tokio::test]
    async fn test_initialize_reports_server_info() {
        let server = server(vec![], vec![]);

        let response = call(
            &server,
            json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {} }),
        )
        .await;

        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(
            response["result"]["serverInfo"]["name"],
            "Atlassian MCP Server"
        );
        assert!(response["result"]["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_tools_list_names() {
        let server = server(vec![], vec![]);

        let response = call(
            &server,
            json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }),
        )
        .await;

        let names: Vec<&str> = response["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "search_jira_tickets",
                "get_jira_tickets_by_assignee",
                "get_jira_tickets_by_creator",
                "get_jira_tickets_in_timeframe",
                "get_jira_ticket",
                "search_confluence_pages",
                "get_confluence_page_links",
                "get_confluence_page",
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let server = server(vec![], vec![]);

        let response = call(
            &server,
            json!({ "jsonrpc": "2.0", "id": 3, "method": "resources/list" }),
        )
        .await;

        assert_eq!(response["error"]["code"], -32601);
        assert_eq!(response["id"], 3);
    }

    #[tokio::test]
    async fn test_parse_error() {
        let server = server(vec![], vec![]);

        let response = handle_request("{not json", &server).await.unwrap();

        let response = serde_json::to_value(response).unwrap();
        assert_eq!(response["error"]["code"], -32700);
        assert_eq!(response["id"], Value::Null);
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let server = server(vec![], vec![]);

        let response = handle_request(
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            &server,
        )
        .await;

        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_ping() {
        let server = server(vec![], vec![]);

        let response = call(&server, json!({ "jsonrpc": "2.0", "id": 4, "method": "ping" })).await;

        assert_eq!(response["result"], json!({}));
    }
}
