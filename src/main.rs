//! Derrick server binary
//!
//! Wires the construction graph explicitly: config → store → adapters →
//! router, then serves until shutdown.

use clap::Parser;
use derrick::api::{serve, AppState};
use derrick::config::Config;
use derrick::store::FileStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// WITSML drilling-data server
#[derive(Parser, Debug)]
#[command(name = "derrick", version, about)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the store data directory
    #[arg(long)]
    data_dir: Option<String>,

    /// Override the API port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "derrick=info,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Derrick v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(data_dir) = args.data_dir {
        config.store.data_dir = data_dir;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }

    tracing::info!("Data directory: {}", config.store.data_dir);
    tracing::info!(
        "Chunk sizes: depth={}, time={}us",
        config.channel.depth_chunk_size,
        config.channel.time_chunk_size
    );

    let store = Arc::new(FileStore::open(&config.store.data_dir)?);
    let state = AppState::new(store, config.channel.clone(), config.api.clone());

    serve(state, &config.api).await?;

    Ok(())
}
