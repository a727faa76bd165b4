use crate::prelude::*;
use clap::Parser;

mod atlassian;
mod config;
mod error;
mod http;
mod mcp;
mod prelude;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Search Jira issues and Confluence pages, from the terminal or as MCP tools"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "ATLASSIAN_MCP_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Model Context Protocol server
    MCP(crate::mcp::App),

    /// Jira issue search
    #[clap(subcommand)]
    Jira(crate::atlassian::jira::Commands),

    /// Confluence page search
    #[clap(subcommand)]
    Confluence(crate::atlassian::confluence::Commands),

    /// Check the Jira and Confluence connections
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::MCP(sub_app) => crate::mcp::run(sub_app, app.global).await,
        SubCommands::Jira(cmd) => crate::atlassian::run_jira(cmd, app.global).await,
        SubCommands::Confluence(cmd) => crate::atlassian::run_confluence(cmd, app.global).await,
        SubCommands::Check => crate::atlassian::check(app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
