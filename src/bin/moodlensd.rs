//! moodlensd — Moodlens daemon.
//!
//! Loads both classifiers once at startup and serves `POST /analyze` over
//! HTTP.

use std::net::SocketAddr;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use moodlens::MoodlensError;
use moodlens::server::{self, Config};

/// Moodlens daemon — text sentiment and emotion analysis service.
#[derive(Parser)]
#[command(name = "moodlensd")]
#[command(version = moodlens::PKG_VERSION)]
#[command(about = "Moodlens sentiment and emotion analysis daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "MOODLENS_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Address to bind to, overriding `server.address`.
    #[arg(short, long, env = "MOODLENS_ADDRESS")]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: info for the daemon; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(address) = args.address {
        config.server.address = address;
    }

    let addr: SocketAddr = config
        .server
        .address
        .parse()
        .map_err(|e| MoodlensError::Configuration(format!("Invalid address: {e}")))?;

    info!(version = moodlens::version_string(), %addr, "moodlensd starting");

    // Model download and session setup block; do them before binding.
    let models = config.models.clone();
    let analyzer = tokio::task::spawn_blocking(move || server::load_analyzer(&models)).await??;

    let listener = TcpListener::bind(addr).await?;
    server::serve(listener, analyzer, shutdown_signal()).await?;

    info!("moodlensd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
