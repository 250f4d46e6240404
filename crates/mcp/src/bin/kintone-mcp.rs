// kintone MCP server binary, speaks JSON-RPC on stdin/stdout

use anyhow::{Context, Result};
use clap::Parser;
use kintone_mcp::tools::{register_all, ToolRegistry};
use kintone_mcp::{Args, McpServer, Settings};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // .env before clap so KINTONE_* values reach the env fallbacks
    let dotenv = dotenvy::dotenv();

    let args = Args::parse();
    let settings = Settings::load(args).context("Failed to load settings")?;

    // stdout carries protocol frames; logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_level.clone().into()),
        )
        .with_target(false)
        .init();

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded environment from .env"),
        Err(e) => tracing::debug!(error = %e, "no .env file loaded"),
    }

    tracing::info!(
        domain = %settings.domain,
        auth = ?settings.auth_type(),
        timeout_secs = settings.timeout.as_secs(),
        "kintone MCP server starting"
    );

    let client = Arc::new(
        settings
            .build_client()
            .context("Failed to create kintone client")?,
    );

    let mut registry = ToolRegistry::new();
    register_all(&mut registry, client);
    tracing::info!("Registered {} tools", registry.len());

    McpServer::new(registry).run_stdio().await
}
