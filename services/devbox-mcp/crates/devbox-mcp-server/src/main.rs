//! devbox MCP server entry point.
//!
//! Initialises tracing (to stderr, so stdout stays free for the stdio
//! transport), loads configuration from `DEVBOX_*` environment variables,
//! and serves the `devbox_launch`, `devbox_status` and `devbox_terminate`
//! tools until the transport closes.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("devbox-mcp starting");

    let config = devbox_mcp_server::server::load_config()?;
    tracing::info!(
        transport = ?config.transport,
        aws_bin = %config.aws_bin,
        aws_region = ?config.aws_region,
        aws_profile = ?config.aws_profile,
        "configuration loaded",
    );

    devbox_mcp_server::server::serve(config).await?;

    tracing::info!("devbox-mcp shut down");
    Ok(())
}
