use crate::atlassian::Searchers;
use crate::prelude::{eprintln, *};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use super::cli::StdioOptions;
use super::Server;

pub async fn run_stdio(options: StdioOptions, global: crate::Global) -> Result<()> {
    if global.verbose {
        eprintln!("Starting MCP server with stdio transport...");
        eprintln!();
    }

    let searchers = Searchers::from_env().map_err(|e| {
        log::warn!("Atlassian configuration error, tool calls will fail: {e}");
        format!("Atlassian configuration error: {e}")
    });
    let server = Server::new(
        options.server_name,
        options
            .server_version
            .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
        global.verbose,
        searchers,
    );
    log::info!("{} running on stdio", server.name);

    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut reader = BufReader::new(stdin);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            break; // EOF
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if global.verbose {
            eprintln!("Received: {trimmed}");
        }

        let Some(response) = super::handle_request(trimmed, &server).await else {
            continue;
        };
        let response_json = serde_json::to_string(&response)?;

        if global.verbose {
            eprintln!("Sending: {response_json}");
        }

        stdout.write_all(response_json.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    Ok(())
}
