use colored::Colorize;

use atlassian_mcp_core::atlassian::jira::{
    build_jql, description_text, search_fields_param, transform_issue, transform_issue_search,
    validate_issue_key, Issue, SearchArgs, SearchRequest, StatusFilter, TeamDirectory,
};
use atlassian_mcp_core::error::{SearchError, Service};
use atlassian_mcp_core::search::SearchResult;

use crate::http::HttpClient;
use crate::prelude::{eprintln, println, *};

const SEARCH_PATH: &str = "/rest/api/3/search";
const MYSELF_PATH: &str = "/rest/api/3/myself";

/// Issue search orchestrator: validate, build JQL, call Jira, transform.
pub struct JiraSearch<C> {
    client: C,
    teams: TeamDirectory,
}

impl<C: HttpClient> JiraSearch<C> {
    pub fn new(client: C, teams: TeamDirectory) -> Self {
        Self { client, teams }
    }

    #[cfg(test)]
    pub(crate) fn client(&self) -> &C {
        &self.client
    }

    pub fn teams(&self) -> &TeamDirectory {
        &self.teams
    }

    pub async fn search_issues(&self, args: SearchArgs) -> Result<SearchResult<Issue>, SearchError> {
        let options = args.validate(&self.teams)?;
        let jql = build_jql(&options);
        log::debug!("Jira search JQL: {jql}");

        let body = SearchRequest::new(jql, options.start_at, options.max_results).into_body();
        let payload = self
            .client
            .post(SEARCH_PATH, body)
            .await
            .map_err(|e| e.into_search_error(Service::Jira))?;

        let result = transform_issue_search(payload, options.start_at, options.max_results)?;
        log::info!(
            "Jira search returned {} issue(s) (total {:?})",
            result.len(),
            result.total
        );
        Ok(result)
    }

    pub async fn get_issue(&self, key: &str) -> Result<Issue, SearchError> {
        let key = validate_issue_key(key)?;
        let path = format!("/rest/api/3/issue/{}", urlencoding::encode(&key));
        let params = [
            ("fields", search_fields_param()),
            ("expand", "renderedFields".to_string()),
        ];

        let payload = self
            .client
            .get(&path, &params)
            .await
            .map_err(|e| e.into_search_error(Service::Jira))?;
        transform_issue(payload)
    }

    pub async fn by_assignee(
        &self,
        assignee: String,
        created_after: Option<String>,
        created_before: Option<String>,
        max_results: Option<i64>,
    ) -> Result<SearchResult<Issue>, SearchError> {
        self.search_issues(SearchArgs::by_assignee(
            assignee,
            created_after,
            created_before,
            max_results,
        ))
        .await
    }

    pub async fn by_creator(
        &self,
        creator: String,
        created_after: Option<String>,
        created_before: Option<String>,
        max_results: Option<i64>,
    ) -> Result<SearchResult<Issue>, SearchError> {
        self.search_issues(SearchArgs::by_creator(
            creator,
            created_after,
            created_before,
            max_results,
        ))
        .await
    }

    pub async fn in_timeframe(
        &self,
        start: String,
        end: String,
        max_results: Option<i64>,
    ) -> Result<SearchResult<Issue>, SearchError> {
        self.search_issues(SearchArgs::in_timeframe(start, end, max_results))
            .await
    }

    /// `GET /rest/api/3/myself` succeeds.
    pub async fn test_connection(&self) -> bool {
        match self.client.get(MYSELF_PATH, &[]).await {
            Ok(_) => true,
            Err(e) => {
                log::warn!("Jira connection check failed: {e}");
                false
            }
        }
    }
}

/// Jira commands
#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Search Jira issues with structured filters
    #[clap(name = "search")]
    Search(SearchOptions),

    /// Get a single Jira issue by key
    #[clap(name = "get")]
    Get(GetOptions),
}

/// Options for searching Jira issues
#[derive(Debug, clap::Args, Clone)]
#[command(after_help = "EXAMPLES:
  # Open tickets assigned to someone in a project:
  atlassian-mcp jira search --assignee dev@acme.io --project OPS --status Open

  # Several statuses at once:
  atlassian-mcp jira search --project OPS --status \"To Do\" --status \"In Progress\"

  # Tickets for a team created this year, mentioning kong:
  atlassian-mcp jira search --team devops --created-after 2024-01-01 --text kong")]
pub struct SearchOptions {
    #[arg(long)]
    pub assignee: Option<String>,

    #[arg(long)]
    pub creator: Option<String>,

    /// Team name, resolved through ATLASSIAN_TEAMS_FILE
    #[arg(long, conflicts_with = "team_id")]
    pub team: Option<String>,

    /// Raw team identifier
    #[arg(long)]
    pub team_id: Option<String>,

    #[arg(long)]
    pub project: Option<String>,

    /// Status; repeat for several
    #[arg(long)]
    pub status: Vec<String>,

    #[arg(long)]
    pub created_after: Option<String>,

    #[arg(long)]
    pub created_before: Option<String>,

    #[arg(long)]
    pub updated_after: Option<String>,

    #[arg(long)]
    pub updated_before: Option<String>,

    /// Free text matched against summary and description; repeat to OR terms
    #[arg(long)]
    pub text: Vec<String>,

    /// Summary term; repeat to OR terms
    #[arg(long)]
    pub summary: Vec<String>,

    /// Description term; repeat to OR terms
    #[arg(long)]
    pub description: Vec<String>,

    /// Maximum number of results to return (1-100)
    #[arg(short, long, default_value = "50")]
    pub limit: i64,

    /// Index of the first result
    #[arg(long, default_value = "0")]
    pub start_at: i64,

    /// Print the generated JQL and exit
    #[arg(long)]
    pub jql: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

fn non_empty(terms: Vec<String>) -> Option<Vec<String>> {
    if terms.is_empty() {
        None
    } else {
        Some(terms)
    }
}

impl From<SearchOptions> for SearchArgs {
    fn from(options: SearchOptions) -> Self {
        let status = match options.status.len() {
            0 => None,
            1 => options.status.into_iter().next().map(StatusFilter::Single),
            _ => Some(StatusFilter::Many(options.status)),
        };

        SearchArgs {
            assignee: options.assignee,
            creator: options.creator,
            team: options.team,
            team_identifier: options.team_id,
            project: options.project,
            status,
            created_after: options.created_after,
            created_before: options.created_before,
            updated_after: options.updated_after,
            updated_before: options.updated_before,
            text_search_terms: non_empty(options.text),
            summary_terms: non_empty(options.summary),
            description_terms: non_empty(options.description),
            max_results: Some(options.limit),
            start_at: Some(options.start_at),
            ..Default::default()
        }
    }
}

/// Options for reading a single issue
#[derive(Debug, clap::Args, Clone)]
pub struct GetOptions {
    /// Issue key (e.g., "OPS-123")
    pub key: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

async fn search_handler<C: HttpClient>(search: &JiraSearch<C>, options: SearchOptions) -> Result<()> {
    let json = options.json;
    let show_jql = options.jql;
    let args = SearchArgs::from(options);

    if show_jql {
        let validated = args.validate(search.teams())?;
        println!("{}", build_jql(&validated));
        return Ok(());
    }

    let data = search.search_issues(args).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    let window = data.window();
    match data.total {
        Some(total) => println!(
            "Showing {} of {} issue(s) from offset {}:\n",
            data.len(),
            total,
            window.start
        ),
        None => println!("Found {} issue(s):\n", data.len()),
    }

    if data.is_empty() {
        println!("No issues found.");
        return Ok(());
    }

    let mut table = new_table();
    table.add_row(prettytable::row![
        "Key".bold().cyan(),
        "Summary".bold().cyan(),
        "Status".bold().cyan(),
        "Assignee".bold().cyan(),
        "Updated".bold().cyan()
    ]);

    for issue in &data.results {
        let assignee = issue
            .fields
            .assignee
            .as_ref()
            .map(|a| a.label().bright_magenta().to_string())
            .unwrap_or_else(|| "Unassigned".bright_black().to_string());
        table.add_row(prettytable::row![
            issue.key.cyan().to_string(),
            &issue.fields.summary,
            issue.fields.status.name.green().to_string(),
            assignee,
            issue.fields.updated.bright_black().to_string()
        ]);
    }

    table.printstd();
    Ok(())
}

async fn get_handler<C: HttpClient>(search: &JiraSearch<C>, options: GetOptions) -> Result<()> {
    let issue = search.get_issue(&options.key).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&issue)?);
        return Ok(());
    }

    display_issue(&issue);
    Ok(())
}

fn display_issue(issue: &Issue) {
    let fields = &issue.fields;
    println!(
        "\n{} - {}\n",
        issue.key.bold().cyan(),
        fields.summary.bright_white()
    );

    let mut table = new_table();
    table.add_row(prettytable::row![
        "Status".bold().cyan(),
        fields.status.name.green().to_string()
    ]);
    if let Some(priority) = &fields.priority {
        table.add_row(prettytable::row![
            "Priority".bold().cyan(),
            priority.name.bright_yellow().to_string()
        ]);
    }
    if !fields.issuetype.name.is_empty() {
        table.add_row(prettytable::row![
            "Type".bold().cyan(),
            fields.issuetype.name.bright_blue().to_string()
        ]);
    }
    if !fields.project.key.is_empty() {
        table.add_row(prettytable::row![
            "Project".bold().cyan(),
            format!("{} ({})", fields.project.name, fields.project.key)
        ]);
    }

    for (label, person) in [
        ("Assignee", &fields.assignee),
        ("Creator", &fields.creator),
        ("Reporter", &fields.reporter),
    ] {
        let value = person
            .as_ref()
            .map(|p| p.label().bright_magenta().to_string())
            .unwrap_or_else(|| "-".bright_black().to_string());
        table.add_row(prettytable::row![label.bold().cyan(), value]);
    }

    table.add_row(prettytable::row![
        "Created".bold().cyan(),
        fields.created.bright_black().to_string()
    ]);
    table.add_row(prettytable::row![
        "Updated".bold().cyan(),
        fields.updated.bright_black().to_string()
    ]);
    table.printstd();

    if let Some(description) = description_text(fields.description.as_ref()) {
        println!("\n{}:", "Description".bold().cyan());
        println!("{description}\n");
    }
}

/// Run Jira commands
pub async fn run<C: HttpClient>(cmd: Commands, search: JiraSearch<C>, global: crate::Global) -> Result<()> {
    if global.verbose {
        eprintln!("Running Jira command...");
    }

    match cmd {
        Commands::Search(options) => search_handler(&search, options).await,
        Commands::Get(options) => get_handler(&search, options).await,
    }
}
