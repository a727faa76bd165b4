use crate::prelude::{eprintln, *};
use serde::Deserialize;
use serde_json::Value;

use atlassian_mcp_core::atlassian::confluence::ContentSearchArgs;
use atlassian_mcp_core::atlassian::jira::SearchArgs;
use atlassian_mcp_core::error::{SearchError, ValidationError};
use atlassian_mcp_core::validate;

use super::{tool_result, JsonRpcError, Server, ToolError};
use crate::atlassian::Searchers;
use crate::http::HttpClient;

fn searchers<J, C>(server: &Server<J, C>) -> std::result::Result<&Searchers<J, C>, ToolError> {
    server
        .searchers()
        .map_err(|message| ToolError::NotConfigured(message.to_string()))
}

fn parse<T: serde::de::DeserializeOwned>(arguments: Value) -> std::result::Result<T, ToolError> {
    validate::parse_args(arguments).map_err(|e| ToolError::Search(e.into()))
}

fn required(field: &str, value: Option<String>) -> std::result::Result<String, ToolError> {
    validate::present(value)
        .ok_or_else(|| ToolError::Search(SearchError::from(ValidationError::new(field, "is required"))))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonArgs {
    assignee_email: Option<String>,
    creator_email: Option<String>,
    created_after: Option<String>,
    created_before: Option<String>,
    max_results: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeframeArgs {
    start_date: Option<String>,
    end_date: Option<String>,
    max_results: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueKeyArgs {
    issue_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageLinksArgs {
    query: Option<String>,
    space_key: Option<String>,
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageIdArgs {
    page_id: Option<String>,
}

/// Handle search_jira_tickets
pub async fn handle_search_jira_tickets<J: HttpClient, C: HttpClient>(
    arguments: Value,
    server: &Server<J, C>,
) -> std::result::Result<Value, JsonRpcError> {
    let outcome = async {
        let searchers = searchers(server)?;
        let args = SearchArgs::from_value(arguments).map_err(SearchError::from)?;
        if server.verbose {
            eprintln!("Calling search_jira_tickets: {args:?}");
        }
        Ok::<_, ToolError>(searchers.jira.search_issues(args).await?)
    }
    .await;

    tool_result("search_jira_tickets", outcome)
}

/// Handle get_jira_tickets_by_assignee
pub async fn handle_get_jira_tickets_by_assignee<J: HttpClient, C: HttpClient>(
    arguments: Value,
    server: &Server<J, C>,
) -> std::result::Result<Value, JsonRpcError> {
    let outcome = async {
        let searchers = searchers(server)?;
        let args: PersonArgs = parse(arguments)?;
        let assignee = required("assigneeEmail", args.assignee_email)?;
        if server.verbose {
            eprintln!("Calling get_jira_tickets_by_assignee: assignee={assignee}");
        }
        Ok::<_, ToolError>(searchers
            .jira
            .by_assignee(assignee, args.created_after, args.created_before, args.max_results)
            .await?)
    }
    .await;

    tool_result("get_jira_tickets_by_assignee", outcome)
}

/// Handle get_jira_tickets_by_creator
pub async fn handle_get_jira_tickets_by_creator<J: HttpClient, C: HttpClient>(
    arguments: Value,
    server: &Server<J, C>,
) -> std::result::Result<Value, JsonRpcError> {
    let outcome = async {
        let searchers = searchers(server)?;
        let args: PersonArgs = parse(arguments)?;
        let creator = required("creatorEmail", args.creator_email)?;
        if server.verbose {
            eprintln!("Calling get_jira_tickets_by_creator: creator={creator}");
        }
        Ok::<_, ToolError>(searchers
            .jira
            .by_creator(creator, args.created_after, args.created_before, args.max_results)
            .await?)
    }
    .await;

    tool_result("get_jira_tickets_by_creator", outcome)
}

/// Handle get_jira_tickets_in_timeframe
pub async fn handle_get_jira_tickets_in_timeframe<J: HttpClient, C: HttpClient>(
    arguments: Value,
    server: &Server<J, C>,
) -> std::result::Result<Value, JsonRpcError> {
    let outcome = async {
        let searchers = searchers(server)?;
        let args: TimeframeArgs = parse(arguments)?;
        let start = required("startDate", args.start_date)?;
        let end = required("endDate", args.end_date)?;
        if server.verbose {
            eprintln!("Calling get_jira_tickets_in_timeframe: {start}..{end}");
        }
        Ok::<_, ToolError>(searchers
            .jira
            .in_timeframe(start, end, args.max_results)
            .await?)
    }
    .await;

    tool_result("get_jira_tickets_in_timeframe", outcome)
}

/// Handle get_jira_ticket
pub async fn handle_get_jira_ticket<J: HttpClient, C: HttpClient>(
    arguments: Value,
    server: &Server<J, C>,
) -> std::result::Result<Value, JsonRpcError> {
    let outcome = async {
        let searchers = searchers(server)?;
        let args: IssueKeyArgs = parse(arguments)?;
        let key = required("issueKey", args.issue_key)?;
        if server.verbose {
            eprintln!("Calling get_jira_ticket: issueKey={key}");
        }
        Ok::<_, ToolError>(searchers.jira.get_issue(&key).await?)
    }
    .await;

    tool_result("get_jira_ticket", outcome)
}

/// Handle search_confluence_pages
pub async fn handle_search_confluence_pages<J: HttpClient, C: HttpClient>(
    arguments: Value,
    server: &Server<J, C>,
) -> std::result::Result<Value, JsonRpcError> {
    let outcome = async {
        let searchers = searchers(server)?;
        let args = ContentSearchArgs::from_value(arguments).map_err(SearchError::from)?;
        if server.verbose {
            eprintln!("Calling search_confluence_pages: {args:?}");
        }
        Ok::<_, ToolError>(searchers.confluence.search_pages(args).await?)
    }
    .await;

    tool_result("search_confluence_pages", outcome)
}

/// Handle get_confluence_page_links
pub async fn handle_get_confluence_page_links<J: HttpClient, C: HttpClient>(
    arguments: Value,
    server: &Server<J, C>,
) -> std::result::Result<Value, JsonRpcError> {
    let outcome = async {
        let searchers = searchers(server)?;
        let args: PageLinksArgs = parse(arguments)?;
        let query = args.query.ok_or_else(|| {
            ToolError::Search(ValidationError::new("query", "is required (may be empty)").into())
        })?;
        if server.verbose {
            eprintln!(
                "Calling get_confluence_page_links: query={query}, spaceKey={:?}, limit={:?}",
                args.space_key, args.limit
            );
        }
        Ok::<_, ToolError>(searchers
            .confluence
            .page_links(query, args.space_key, args.limit)
            .await?)
    }
    .await;

    tool_result("get_confluence_page_links", outcome)
}

/// Handle get_confluence_page
pub async fn handle_get_confluence_page<J: HttpClient, C: HttpClient>(
    arguments: Value,
    server: &Server<J, C>,
) -> std::result::Result<Value, JsonRpcError> {
    let outcome = async {
        let searchers = searchers(server)?;
        let args: PageIdArgs = parse(arguments)?;
        let id = required("pageId", args.page_id)?;
        if server.verbose {
            eprintln!("Calling get_confluence_page: pageId={id}");
        }
        Ok::<_, ToolError>(searchers.confluence.get_page(&id).await?)
    }
    .await;

    tool_result("get_confluence_page", outcome)
}

#[cfg(test)]
mod tests {
    use super::super::handle_tools_call;
    use super::*;
    use crate::http::mock::Request;
    use crate::http::HttpError;
    use crate::http::mock::MockClient;
    use crate::mcp::tests::server;
    use serde_json::json;

    async fn call_tool(server: &Server<MockClient, MockClient>, name: &str, arguments: Value) -> Value {
        handle_tools_call(Some(json!({ "name": name, "arguments": arguments })), server)
            .await
            .unwrap()
    }

    fn text(result: &Value) -> &str {
        result["content"][0]["text"].as_str().unwrap()
    }

    fn issues() -> Value {
        json!({
            "startAt": 0,
            "maxResults": 50,
            "total": 1,
            "issues": [{
                "id": "1",
                "key": "OPS-1",
                "fields": { "summary": "Rotate certificates", "status": { "name": "Open" } }
            }]
        })
    }

    #[tokio::test]
    async fn test_search_jira_tickets() {
        // Arrange
        let server = server(vec![Ok(issues())], vec![]);

        // Act
        let result = call_tool(
            &server,
            "search_jira_tickets",
            json!({ "assignee": "a@x.com", "project": "TEST", "status": ["To Do", "In Progress"] }),
        )
        .await;

        // Assert
        assert!(result.get("isError").is_none());
        let body: Value = serde_json::from_str(text(&result)).unwrap();
        assert_eq!(body["results"][0]["key"], "OPS-1");
        assert_eq!(body["total"], 1);

        let requests = server.searchers().unwrap().jira.client().requests();
        let Request::Post { body, .. } = &requests[0] else {
            panic!("expected a POST");
        };
        assert_eq!(
            body["jql"],
            r#"assignee = "a@x.com" AND project = "TEST" AND status IN ("To Do", "In Progress")"#
        );
    }

    #[tokio::test]
    async fn test_validation_error_is_a_tool_error() {
        let server = server(vec![], vec![]);

        let result = call_tool(&server, "search_jira_tickets", json!({ "maxResults": 0 })).await;

        assert_eq!(result["isError"], true);
        assert!(text(&result).starts_with("Error: Validation error: maxResults"));
        assert!(server.searchers().unwrap().jira.client().requests().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_team_lists_known_teams() {
        let server = server(vec![], vec![]);

        let result = call_tool(&server, "search_jira_tickets", json!({ "team": "sales" })).await;

        assert_eq!(result["isError"], true);
        assert_eq!(text(&result), "Error: Unknown team 'sales'. Known teams: devops");
    }

    #[tokio::test]
    async fn test_preset_requires_its_person() {
        let server = server(vec![], vec![]);

        let result = call_tool(&server, "get_jira_tickets_by_assignee", json!({})).await;

        assert_eq!(result["isError"], true);
        assert_eq!(
            text(&result),
            "Error: Validation error: assigneeEmail: is required"
        );
    }

    #[tokio::test]
    async fn test_timeframe_preset() {
        let server = server(vec![Ok(json!({ "issues": [] }))], vec![]);

        let result = call_tool(
            &server,
            "get_jira_tickets_in_timeframe",
            json!({ "startDate": "2024-01-01", "endDate": "2024-01-31" }),
        )
        .await;

        assert!(result.get("isError").is_none());
        let requests = server.searchers().unwrap().jira.client().requests();
        let Request::Post { body, .. } = &requests[0] else {
            panic!("expected a POST");
        };
        assert_eq!(
            body["jql"],
            r#"created >= "2024-01-01" AND created <= "2024-01-31""#
        );
        assert_eq!(body["maxResults"], 50);
    }

    #[tokio::test]
    async fn test_upstream_error_is_a_tool_error() {
        let server = server(
            vec![Err(HttpError::Status {
                status: 400,
                reason: "Bad Request".to_string(),
                body: json!({ "errorMessages": ["The value 'NOPE' does not exist for the field 'project'."] }),
            })],
            vec![],
        );

        let result = call_tool(&server, "search_jira_tickets", json!({ "project": "NOPE" })).await;

        assert_eq!(result["isError"], true);
        assert_eq!(
            text(&result),
            "Error: Jira API error: 400 - The value 'NOPE' does not exist for the field 'project'."
        );
    }

    #[tokio::test]
    async fn test_page_links_tool() {
        let page = json!({
            "id": "7",
            "status": "current",
            "title": "Kong Gateway",
            "spaceId": "42",
            "_links": { "webui": "/spaces/DEVOPS/pages/7" }
        });
        let server = server(vec![], vec![Ok(json!({ "results": [page] }))]);

        let result = call_tool(&server, "get_confluence_page_links", json!({ "query": "kong" })).await;

        let body: Value = serde_json::from_str(text(&result)).unwrap();
        assert_eq!(
            body["links"],
            json!(["https://acme.atlassian.net/wiki/spaces/DEVOPS/pages/7"])
        );
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn test_search_confluence_requires_query() {
        let server = server(vec![], vec![]);

        let result = call_tool(&server, "search_confluence_pages", json!({ "spaceKey": "OPS" })).await;

        assert_eq!(result["isError"], true);
        assert!(text(&result).contains("query"));
    }

    #[tokio::test]
    async fn test_unconfigured_server_reports_tool_error() {
        let server: Server<MockClient, MockClient> = Server::new(
            "Atlassian MCP Server".to_string(),
            "1.0.0".to_string(),
            false,
            Err("Atlassian configuration error: ATLASSIAN_BASE_URL environment variable not set".to_string()),
        );

        let result = call_tool(&server, "get_confluence_page", json!({ "pageId": "1" })).await;

        assert_eq!(result["isError"], true);
        assert_eq!(
            text(&result),
            "Error: Atlassian configuration error: ATLASSIAN_BASE_URL environment variable not set"
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_is_a_protocol_error() {
        let server = server(vec![], vec![]);

        let err = handle_tools_call(Some(json!({ "name": "create_jira_ticket" })), &server)
            .await
            .unwrap_err();

        assert_eq!(err.code, -32602);
        assert_eq!(err.message, "Unknown tool: create_jira_ticket");
    }
}
