use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

mod cli;

use gopilot_core::Engine;
use gopilot_router::gateway_router;
use gopilot_upstream::{UpstreamClient, WreqUpstreamClient, resolve_target};

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("gopilot failed: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let bind = format!("{}:{}", cli.host, cli.port);
    let config = cli.into_config();

    // Targets are resolved per request, so a broken configuration is not
    // fatal here; it just means every chat request will 503 until fixed.
    match resolve_target(&config) {
        Ok(target) => info!(url = %target.url, style = ?target.style, "upstream resolved"),
        Err(err) => warn!(%err, "upstream not resolvable, chat requests will fail"),
    }

    let client: Arc<dyn UpstreamClient> = Arc::new(WreqUpstreamClient::new()?);
    let engine = Arc::new(Engine::new(config, client));
    let app = gateway_router(engine);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!(addr = %bind, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("gopilot=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
