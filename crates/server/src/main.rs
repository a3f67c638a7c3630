//! ogtag server entry point.
//!
//! Loads configuration, builds the shared [`pipeline::AppContext`] and serves
//! either HTTP (`POST /`) or the MCP `og_tag` tool on stdio.
//! Logging goes to stderr so stdout stays free for the JSON-RPC protocol.

use std::sync::Arc;

use anyhow::{Context, Result};
use ogtag_core::{AppConfig, Transport};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod http;
mod pipeline;
mod request;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let transport = config.transport;
    let bind_addr = config.bind_addr.clone();

    tracing::info!(db_path = %config.db_path.display(), ?transport, "Starting ogtag");

    let ctx = Arc::new(
        pipeline::AppContext::from_config(config)
            .await
            .context("opening tag cache")?,
    );

    match transport {
        Transport::Http => http::serve(ctx, &bind_addr).await?,
        Transport::Stdio => {
            let server = serve_server(handler::OgTagServer::new(ctx), stdio()).await?;
            server.waiting().await?;
        }
    }

    Ok(())
}
