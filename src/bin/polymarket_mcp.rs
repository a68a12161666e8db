//! Polymarket MCP server over stdio.
//!
//! ```sh
//! POLYMARKET_API_VARIANT=market-data polymarket-mcp
//! ```
//!
//! Stdout carries the protocol, so logs go to stderr, or to a file:
//! ```sh
//! LOG_FILE=mcp.log RUST_LOG=info,hyper_util=off,reqwest=off polymarket-mcp
//! ```

use std::fs::File;

use polymarket_mcp::config::API_URL_VAR;
use polymarket_mcp::server::Server;
use polymarket_mcp::{Client, Config};
use tokio::io::{AsyncBufReadExt as _, AsyncWriteExt as _, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Ok(path) = std::env::var("LOG_FILE") {
        let file = File::create(path)?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(file)
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    init_tracing()?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded environment from .env"),
        Err(_) => info!("no .env file found, using process environment"),
    }

    let config = Config::from_env();
    if std::env::var(API_URL_VAR).is_err() {
        warn!(
            url = config.api_url(),
            "{API_URL_VAR} is not set, using the default for the {} variant",
            config.variant()
        );
    }

    info!(
        variant = %config.variant(),
        api_url = config.api_url(),
        chain_id = config.chain_id(),
        auth_enabled = config.auth_enabled(),
        signing_key = config.signing_key().is_some(),
        funder = config.funding_id().is_some(),
        "resolved configuration"
    );

    let client = Client::new(config)?;
    if client.config().auth_required() && !client.authentication_available() {
        warn!("authentication is required but unavailable, order management tools will fail");
    }

    let server = Server::new(client);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    info!("serving MCP on stdio");

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        if let Some(response) = server.handle_message(&line).await {
            stdout.write_all(response.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
    }

    info!("stdin closed, shutting down");

    Ok(())
}
