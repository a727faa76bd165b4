#[derive(Debug, clap::Parser)]
#[command(name = "mcp")]
#[command(about = "Model Context Protocol server")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Start MCP server with stdio transport
    #[clap(name = "stdio")]
    Stdio(StdioOptions),
}

#[derive(Debug, clap::Args)]
pub struct StdioOptions {
    /// Name reported to MCP clients
    #[arg(long, env = "MCP_SERVER_NAME", default_value = "Atlassian MCP Server")]
    pub server_name: String,

    /// Version reported to MCP clients (defaults to the binary's version)
    #[arg(long, env = "MCP_SERVER_VERSION")]
    pub server_version: Option<String>,
}
