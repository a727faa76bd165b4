use colored::Colorize;
use serde::Serialize;

use atlassian_mcp_core::atlassian::confluence::{
    build_cql, link_base, links_only, normalize_page, normalize_with_report, ContentSearchArgs,
    ContentSearchOptions, ContentType, Generation, LinksOnlyResult, OutputFormat, Page,
    PageRequest,
};
use atlassian_mcp_core::error::{SearchError, Service, ValidationError};
use atlassian_mcp_core::search::SearchResult;

use crate::http::HttpClient;
use crate::prelude::{eprintln, println, *};

const CURRENT_PAGES_PATH: &str = "/wiki/api/v2/pages";
const CURRENT_BLOGPOSTS_PATH: &str = "/wiki/api/v2/blogposts";
const LEGACY_SEARCH_PATH: &str = "/wiki/rest/api/content/search";
const LEGACY_CONTENT_PATH: &str = "/wiki/rest/api/content";

/// A page search answered in the caller's requested output format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PageSearchOutput {
    Full(SearchResult<Page>),
    LinksOnly(LinksOnlyResult),
}

/// How a content search reaches Confluence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// List the space's pages and filter them locally by text and type.
    SpaceScoped { space: String },
    /// Hand the whole query to Confluence as CQL.
    GlobalCql { cql: String },
}

/// The space-scoped listing is only used against the current API, and only
/// when a space resolves.
pub fn choose_strategy(
    options: &ContentSearchOptions,
    default_space: &str,
    generation: Generation,
) -> Strategy {
    match (generation, options.resolve_space(default_space)) {
        (Generation::Current, Some(space)) => Strategy::SpaceScoped {
            space: space.to_string(),
        },
        _ => Strategy::GlobalCql {
            cql: build_cql(options, default_space),
        },
    }
}

/// The wiki root page `webui` paths are relative to.
pub fn wiki_base(site: &str) -> String {
    let site = site.trim_end_matches('/');
    if site.ends_with("/wiki") {
        site.to_string()
    } else {
        format!("{site}/wiki")
    }
}

/// Accept either a bare cursor token or the full `_links.next` link it came in.
pub fn cursor_token(cursor: &str) -> String {
    let cursor = cursor.trim();
    let Some((_, rest)) = cursor.split_once("cursor=") else {
        return cursor.to_string();
    };
    let raw = rest.split('&').next().unwrap_or(rest);
    urlencoding::decode(raw)
        .map(|token| token.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Content search orchestrator: validate, pick a strategy, call Confluence,
/// normalize, project.
pub struct ConfluenceSearch<C> {
    client: C,
    default_space: String,
    generation: Generation,
    link_base: String,
}

impl<C: HttpClient> ConfluenceSearch<C> {
    pub fn new(client: C, site: &str, default_space: String, generation: Generation) -> Self {
        Self {
            client,
            default_space,
            generation,
            link_base: wiki_base(site),
        }
    }

    #[cfg(test)]
    pub(crate) fn client(&self) -> &C {
        &self.client
    }

    pub async fn search_pages(&self, args: ContentSearchArgs) -> Result<PageSearchOutput, SearchError> {
        let options = args.validate()?;
        let result = self.fetch(&options).await?;

        Ok(match options.output_format {
            OutputFormat::Full => PageSearchOutput::Full(result),
            OutputFormat::LinksOnly => {
                PageSearchOutput::LinksOnly(links_only(&result, &self.link_base))
            }
        })
    }

    /// Absolute links for pages matching `query`.
    pub async fn page_links(
        &self,
        query: String,
        space_key: Option<String>,
        limit: Option<i64>,
    ) -> Result<LinksOnlyResult, SearchError> {
        let options = ContentSearchArgs::links(query, space_key, limit).validate()?;
        let result = self.fetch(&options).await?;
        Ok(links_only(&result, &self.link_base))
    }

    pub async fn get_page(&self, id: &str) -> Result<Page, SearchError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ValidationError::new("id", "is required").into());
        }
        let id = urlencoding::encode(id);

        let (path, params) = match self.generation {
            Generation::Current => (
                format!("{CURRENT_PAGES_PATH}/{id}"),
                vec![("body-format", "storage".to_string())],
            ),
            Generation::Legacy => (
                format!("{LEGACY_CONTENT_PATH}/{id}"),
                vec![("expand", "space,version,body.storage".to_string())],
            ),
        };

        let payload = self
            .client
            .get(&path, &params)
            .await
            .map_err(|e| e.into_search_error(Service::Confluence))?;
        normalize_page(&payload)
    }

    /// One-result listing against the configured API generation.
    pub async fn test_connection(&self) -> bool {
        let path = match self.generation {
            Generation::Current => CURRENT_PAGES_PATH,
            Generation::Legacy => LEGACY_CONTENT_PATH,
        };
        match self.client.get(path, &[("limit", "1".to_string())]).await {
            Ok(_) => true,
            Err(e) => {
                log::warn!("Confluence connection check failed: {e}");
                false
            }
        }
    }

    fn page_params(&self, page: &PageRequest) -> Result<Vec<(&'static str, String)>, ValidationError> {
        match (self.generation, page) {
            (Generation::Current, PageRequest::Offset(0)) => Ok(vec![]),
            (Generation::Current, PageRequest::Offset(_)) => Err(ValidationError::new(
                "start",
                "the v2 API paginates by cursor; pass the previous result's next link as cursor",
            )),
            (Generation::Current, PageRequest::Cursor(cursor)) => {
                Ok(vec![("cursor", cursor_token(cursor))])
            }
            (Generation::Legacy, PageRequest::Offset(start)) => {
                Ok(vec![("start", start.to_string())])
            }
            (Generation::Legacy, PageRequest::Cursor(_)) => Err(ValidationError::new(
                "cursor",
                "the v1 API paginates by offset; use start instead",
            )),
        }
    }

    async fn fetch(&self, options: &ContentSearchOptions) -> Result<SearchResult<Page>, SearchError> {
        let mut params = vec![("limit", options.limit.to_string())];
        params.extend(self.page_params(&options.page)?);

        let strategy = choose_strategy(options, &self.default_space, self.generation);
        let path = match &strategy {
            Strategy::SpaceScoped { space } => {
                log::debug!("Confluence space-scoped listing of {space}");
                params.push(("space-key", space.clone()));
                params.push(("body-format", "storage".to_string()));
                match options.content_type {
                    ContentType::Page => CURRENT_PAGES_PATH,
                    ContentType::Blogpost => CURRENT_BLOGPOSTS_PATH,
                }
            }
            Strategy::GlobalCql { cql } => {
                log::debug!("Confluence CQL: {cql}");
                params.push(("cql", cql.clone()));
                match self.generation {
                    Generation::Current => CURRENT_PAGES_PATH,
                    Generation::Legacy => {
                        params.push(("expand", "space,version".to_string()));
                        LEGACY_SEARCH_PATH
                    }
                }
            }
        };

        let payload = self
            .client
            .get(path, &params)
            .await
            .map_err(|e| e.into_search_error(Service::Confluence))?;

        let normalized = normalize_with_report(&payload, Some(self.generation))?;
        for fallback in &normalized.fallbacks {
            log::warn!("Confluence result needed the flexible parse: {fallback}");
        }

        let mut result = normalized.result;
        if let Strategy::SpaceScoped { .. } = strategy {
            if options.content_type == ContentType::Blogpost {
                for page in &mut result.results {
                    page.content_type = ContentType::Blogpost.to_string();
                }
            }
            let before = result.len();
            result
                .results
                .retain(|page| page.matches_text(&options.query) && page.is_type(options.content_type));
            log::debug!(
                "Confluence local filter kept {} of {} result(s)",
                result.len(),
                before
            );
        }

        log::info!("Confluence search returned {} result(s)", result.len());
        Ok(result)
    }
}

/// Confluence commands
#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Search Confluence pages and blog posts
    #[clap(name = "search")]
    Search(SearchOptions),

    /// Print absolute links to matching pages
    #[clap(name = "links")]
    Links(LinksOptions),

    /// Get a single page by id
    #[clap(name = "get")]
    Get(GetOptions),
}

fn parse_content_type(value: &str) -> std::result::Result<ContentType, String> {
    serde_json::from_value(serde_json::Value::String(value.to_ascii_lowercase()))
        .map_err(|_| format!("'{value}' is not a content type (expected page or blogpost)"))
}

/// Options for searching Confluence content
#[derive(Debug, clap::Args, Clone)]
#[command(after_help = "EXAMPLES:
  # Pages mentioning kong in the default space:
  atlassian-mcp confluence search kong

  # Blog posts in another space, as links:
  atlassian-mcp confluence search release --space ENG --type blogpost --links")]
pub struct SearchOptions {
    /// Text to search for; empty matches everything
    #[arg(default_value = "")]
    pub query: String,

    /// Space key (defaults to CONFLUENCE_DEFAULT_SPACE)
    #[arg(long)]
    pub space: Option<String>,

    /// Content type: page or blogpost
    #[arg(long = "type", default_value = "page", value_parser = parse_content_type)]
    pub content_type: ContentType,

    /// Maximum number of results to return (1-100)
    #[arg(short, long, default_value = "25")]
    pub limit: i64,

    /// Offset of the first result (v1 API)
    #[arg(long, conflicts_with = "cursor")]
    pub start: Option<i64>,

    /// Cursor or next link from a previous page (v2 API)
    #[arg(long)]
    pub cursor: Option<String>,

    /// Only print page links
    #[arg(long)]
    pub links: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl From<SearchOptions> for ContentSearchArgs {
    fn from(options: SearchOptions) -> Self {
        ContentSearchArgs {
            query: Some(options.query),
            space_key: options.space,
            content_type: Some(options.content_type),
            output_format: Some(if options.links {
                OutputFormat::LinksOnly
            } else {
                OutputFormat::Full
            }),
            limit: Some(options.limit),
            start: options.start,
            cursor: options.cursor,
        }
    }
}

/// Options for listing page links
#[derive(Debug, clap::Args, Clone)]
pub struct LinksOptions {
    /// Text to search for
    pub query: String,

    /// Space key (defaults to CONFLUENCE_DEFAULT_SPACE)
    #[arg(long)]
    pub space: Option<String>,

    /// Maximum number of links to return (1-100)
    #[arg(short, long, default_value = "25")]
    pub limit: i64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Options for reading a single page
#[derive(Debug, clap::Args, Clone)]
pub struct GetOptions {
    /// Page id
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

fn print_links(data: &LinksOnlyResult) {
    println!("Found {} link(s):\n", data.total);
    for link in &data.links {
        println!("{}", link.bright_blue());
    }
    if let Some(next) = &data.next {
        println!("\n{} {}", "Next:".bold().cyan(), next.bright_black());
    }
}

fn print_pages(data: &SearchResult<Page>, fallback_base: &str) {
    println!("Found {} result(s):\n", data.len());

    if data.is_empty() {
        println!("No pages found.");
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::row![
        "Title".bold().cyan(),
        "Type".bold().cyan(),
        "Space".bold().cyan(),
        "URL".bold().cyan()
    ]);

    let base = link_base(data, fallback_base);
    for page in &data.results {
        table.add_row(prettytable::row![
            &page.title,
            page.content_type.green().to_string(),
            page.space_label().bright_magenta().to_string(),
            format!("{base}{}", page.links.webui).bright_blue().to_string()
        ]);
    }
    table.printstd();

    if let Some(next) = data.pagination.next_cursor() {
        println!("\n{} {}", "Next:".bold().cyan(), next.bright_black());
    }
}

async fn search_handler<C: HttpClient>(
    search: &ConfluenceSearch<C>,
    options: SearchOptions,
) -> Result<()> {
    let json = options.json;
    let data = search.search_pages(options.into()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    match &data {
        PageSearchOutput::Full(result) => print_pages(result, &search.link_base),
        PageSearchOutput::LinksOnly(links) => print_links(links),
    }
    Ok(())
}

async fn links_handler<C: HttpClient>(
    search: &ConfluenceSearch<C>,
    options: LinksOptions,
) -> Result<()> {
    let data = search
        .page_links(options.query, options.space, Some(options.limit))
        .await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        print_links(&data);
    }
    Ok(())
}

async fn get_handler<C: HttpClient>(search: &ConfluenceSearch<C>, options: GetOptions) -> Result<()> {
    let page = search.get_page(&options.id).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    println!("\n{}\n", page.title.bold().cyan());
    let mut table = new_table();
    table.add_row(prettytable::row!["Id".bold().cyan(), &page.id]);
    table.add_row(prettytable::row![
        "Type".bold().cyan(),
        page.content_type.green().to_string()
    ]);
    table.add_row(prettytable::row!["Space".bold().cyan(), page.space_label()]);
    if let Some(version) = &page.version {
        table.add_row(prettytable::row![
            "Version".bold().cyan(),
            version.number.to_string()
        ]);
    }
    table.add_row(prettytable::row![
        "URL".bold().cyan(),
        format!("{}{}", search.link_base, page.links.webui)
            .bright_blue()
            .to_string()
    ]);
    table.printstd();

    let body = page.body_text();
    if !body.is_empty() {
        println!("\n{body}\n");
    }
    Ok(())
}

/// Run Confluence commands
pub async fn run<C: HttpClient>(
    cmd: Commands,
    search: ConfluenceSearch<C>,
    global: crate::Global,
) -> Result<()> {
    if global.verbose {
        eprintln!("Running Confluence command...");
    }

    match cmd {
        Commands::Search(options) => search_handler(&search, options).await,
        Commands::Links(options) => links_handler(&search, options).await,
        Commands::Get(options) => get_handler(&search, options).await,
    }
}
