//! bankbridge - Plaid and TrueLayer relay server

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;

use bankbridge_core::config::Config;
use bankbridge_core::services::logging;
use bankbridge_core::BridgeContext;
use bankbridge_server::build_router;

/// bankbridge - open-banking relay for Plaid and TrueLayer
#[derive(Parser)]
#[command(name = "bankbridge", version, about, long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Log filter (overrides RUST_LOG), e.g. "debug" or "bankbridge=trace"
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before clap reads PORT/HOST from the environment
    Config::load_dotenv();
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = BridgeContext::from_env().context("Invalid configuration")?;
    tracing::info!(
        plaid_env = ?ctx.config.plaid.environment,
        truelayer_env = ?ctx.config.truelayer.environment,
        timeout_secs = ctx.config.upstream_timeout.as_secs(),
        "configuration loaded"
    );

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", cli.host, cli.port))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(%addr, "bankbridge listening");

    axum::serve(listener, build_router(Arc::new(ctx)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("bankbridge stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
