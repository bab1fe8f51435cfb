use std::sync::Arc;

use anyhow::Context;
use maildrop_core::ClientRegistry;
use maildrop_server::{
    SystemEnv,
    config::{PORT_FILE, ServerConfig},
    run_server,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_port_file(PORT_FILE).context("unable to parse server port")?;
    let listener = TcpListener::bind(config.listen_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr()))?;

    tracing::info!(addr = %config.listen_addr(), "maildrop server listening");

    let registry = Arc::new(ClientRegistry::new(SystemEnv::new()));
    run_server(listener, registry, config.read_timeout).await;

    Ok(())
}
