//! Gmail Batch MCP Server
//!
//! A Model Context Protocol (MCP) server for Gmail with batch mailbox
//! operations. Speaks JSON-RPC over stdio; logs go to stderr.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use gmail_batch_mcp::config::Config;
use gmail_batch_mcp::gmail::auth::TokenProvider;
use gmail_batch_mcp::gmail::client::GmailClient;
use gmail_batch_mcp::mcp::server::McpServer;
use gmail_batch_mcp::mcp::tools::{tool_catalog, ToolHandler};

/// Gmail Batch MCP Server
#[derive(Parser)]
#[command(name = "gmail-batch-mcp")]
#[command(author, version, about = "Gmail MCP server with batch mailbox operations")]
struct Cli {
    /// Skip the post-archive inbox check in archive_emails_batch
    #[arg(long)]
    no_verify_batch_archive: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tool catalog as JSON and exit
    Tools,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Tools) => {
            println!("{}", serde_json::to_string_pretty(&tool_catalog())?);
            Ok(())
        }
        None => {
            let mut config = match Config::from_env() {
                Ok(config) => config,
                Err(e) => {
                    tracing::error!("{}", e);
                    std::process::exit(1);
                }
            };
            if cli.no_verify_batch_archive {
                config.archive_policy.verify_batch = false;
            }
            run_server(config).await
        }
    }
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    let http_client = reqwest::Client::new();
    let archive_policy = config.archive_policy;
    let api_base_url = config.api_base_url.clone();

    let tokens = Arc::new(TokenProvider::new(config, http_client.clone()));
    let gmail_client = Arc::new(GmailClient::new(http_client, api_base_url, tokens));

    tracing::info!(
        "MCP Gmail server started on stdio (verify archive: single={}, batch={})",
        archive_policy.verify_single,
        archive_policy.verify_batch
    );

    let server = McpServer::new(ToolHandler::new(gmail_client, archive_policy));
    server.run_stdio().await.context("MCP server loop failed")?;

    Ok(())
}
