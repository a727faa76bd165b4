use colored::Colorize;

use crate::config::AtlassianConfig;
use crate::http::{HttpClient, ReqwestClient};
use crate::prelude::{eprintln, println, *};

pub mod confluence;
pub mod jira;

pub use confluence::ConfluenceSearch;
pub use jira::JiraSearch;

/// Both search orchestrators, wired to their sites.
pub struct Searchers<J, C> {
    pub jira: JiraSearch<J>,
    pub confluence: ConfluenceSearch<C>,
}

impl Searchers<ReqwestClient, ReqwestClient> {
    pub fn from_config(config: &AtlassianConfig) -> Result<Self, crate::error::Error> {
        let jira_client = ReqwestClient::new(&config.jira, config.timeout)?;
        let confluence_client = ReqwestClient::new(&config.confluence, config.timeout)?;

        Ok(Self {
            jira: JiraSearch::new(jira_client, config.teams.clone()),
            confluence: ConfluenceSearch::new(
                confluence_client,
                &config.confluence.base_url,
                config.default_space.clone(),
                config.generation,
            ),
        })
    }

    pub fn from_env() -> Result<Self, crate::error::Error> {
        Self::from_config(&AtlassianConfig::from_env()?)
    }
}

/// Outcome of checking both sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionReport {
    pub jira: bool,
    pub confluence: bool,
}

impl ConnectionReport {
    pub fn all_ok(&self) -> bool {
        self.jira && self.confluence
    }
}

impl<J: HttpClient, C: HttpClient> Searchers<J, C> {
    pub async fn test_connections(&self) -> ConnectionReport {
        ConnectionReport {
            jira: self.jira.test_connection().await,
            confluence: self.confluence.test_connection().await,
        }
    }
}

fn status_cell(ok: bool) -> String {
    if ok {
        "connected".green().to_string()
    } else {
        "unreachable".red().to_string()
    }
}

/// Check that both sites accept the configured credentials.
pub async fn check(global: crate::Global) -> Result<()> {
    let config = AtlassianConfig::from_env()?;
    if global.verbose {
        eprintln!(
            "Checking Jira at {} and Confluence at {}...",
            config.jira.base_url, config.confluence.base_url
        );
    }

    let searchers = Searchers::from_config(&config)?;
    let report = searchers.test_connections().await;

    let mut table = new_table();
    table.add_row(prettytable::row![
        "Service".bold().cyan(),
        "Site".bold().cyan(),
        "Status".bold().cyan()
    ]);
    table.add_row(prettytable::row![
        "Jira",
        &config.jira.base_url,
        status_cell(report.jira)
    ]);
    table.add_row(prettytable::row![
        "Confluence",
        &config.confluence.base_url,
        status_cell(report.confluence)
    ]);
    table.printstd();

    if report.all_ok() {
        println!("\nAll connections OK.");
        Ok(())
    } else {
        Err(eyre!("one or more Atlassian connections failed"))
    }
}

/// Run a Jira command against the configured site.
pub async fn run_jira(cmd: jira::Commands, global: crate::Global) -> Result<()> {
    let searchers = Searchers::from_env()?;
    jira::run(cmd, searchers.jira, global).await
}

/// Run a Confluence command against the configured site.
pub async fn run_confluence(cmd: confluence::Commands, global: crate::Global) -> Result<()> {
    let searchers = Searchers::from_env()?;
    confluence::run(cmd, searchers.confluence, global).await
}
