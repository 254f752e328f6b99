//! Configuration loading and MCP transport serving.

use anyhow::{Context, Result};
use axum::http::StatusCode;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpService,
};
use rmcp::ServiceExt;

use devbox_common::{ServerConfig, Transport};

use crate::tools::DevboxTools;

/// Environment variable prefix for every configuration field.
pub const ENV_PREFIX: &str = "DEVBOX_";

/// Load configuration from `DEVBOX_*` environment variables.
///
/// # Errors
///
/// Returns an error if any set variable fails to parse.
pub fn load_config() -> Result<ServerConfig> {
    envy::prefixed(ENV_PREFIX)
        .from_env()
        .context("failed to load config from DEVBOX_* env vars")
}

/// Load configuration from explicit `(KEY, value)` pairs (keys include the prefix).
pub fn load_config_from<I>(vars: I) -> Result<ServerConfig>
where
    I: IntoIterator<Item = (String, String)>,
{
    envy::prefixed(ENV_PREFIX)
        .from_iter(vars)
        .context("failed to load config from DEVBOX_* vars")
}

/// Serve the devbox tools on the configured transport until it closes.
pub async fn serve(config: ServerConfig) -> Result<()> {
    match config.transport {
        Transport::Stdio => serve_stdio(&config).await,
        Transport::Http => serve_http(&config).await,
    }
}

async fn serve_stdio(config: &ServerConfig) -> Result<()> {
    tracing::info!("MCP server ready on stdio");
    let service = DevboxTools::from_config(config)
        .serve(rmcp::transport::stdio())
        .await
        .context("failed to start MCP stdio service")?;
    service.waiting().await.context("MCP stdio service error")?;
    Ok(())
}

/// Minimal health-check handler for load-balancer probes.
async fn health() -> StatusCode {
    StatusCode::OK
}

async fn serve_http(config: &ServerConfig) -> Result<()> {
    // A fresh DevboxTools per session; each request still gets its own backend.
    let config_for_factory = config.clone();
    let service = StreamableHttpService::new(
        move || Ok(DevboxTools::from_config(&config_for_factory)),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let router = axum::Router::new()
        .nest_service("/mcp", service)
        .route("/health", axum::routing::get(health));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    tracing::info!("MCP server ready — http://{}/mcp", config.listen_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

/// Wait for SIGINT (Ctrl-C) for graceful shutdown.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("received shutdown signal");
}
