//! veracity-verify - Image verification service
//!
//! Scores uploaded images for authenticity from three independent checks:
//! capture metadata, reverse image search and AI-generation detection.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use veracity_common::config as common_config;

use veracity_verify::AppState;

/// Command-line arguments for veracity-verify
#[derive(Parser, Debug)]
#[command(name = "veracity-verify")]
#[command(about = "Image authenticity verification service")]
#[command(version)]
struct Args {
    /// TOML config file (default: <config dir>/veracity/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root folder holding the result database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind (overrides config)
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = common_config::load_toml_config(args.config.as_deref())
        .context("Failed to load configuration")?;

    // RUST_LOG overrides the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| toml_config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting veracity-verify (Image Verification) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let root_folder = common_config::resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    info!("Root folder: {}", root_folder.display());

    let db_path = common_config::database_path(&root_folder);
    info!("Database: {}", db_path.display());

    let db_pool = veracity_verify::db::init_database_pool(&db_path)
        .await
        .context("Failed to initialize database")?;
    info!("Database connection established");

    let http_client = veracity_verify::services::build_http_client()
        .context("Failed to build HTTP client")?;
    let credentials = veracity_verify::config::resolve_provider_credentials(&toml_config);
    let verifier = veracity_verify::config::build_verifier(&toml_config, &credentials, http_client);

    let state = AppState::new(db_pool, verifier, toml_config.limits.clone());
    let app = veracity_verify::build_router(state);

    let bind = args.bind.unwrap_or_else(|| toml_config.bind_address.clone());
    let port = args.port.unwrap_or(toml_config.port);
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}
