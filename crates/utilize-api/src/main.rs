//! BME Device Financial Dashboard API
//!
//! Loads the device catalog, SAP postings, PACS usage and tariff maps into
//! memory at startup and serves them to the dashboard and the CLI.

mod routes;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use device_finances::config::FileConfig;
use device_finances::store::DataStore;

use routes::AppState;

#[derive(Parser, Debug)]
#[command(name = "utilize-api")]
#[command(about = "Dashboard API for BME device financial analytics")]
struct Args {
    /// Path to the config file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

/// Load config file or exit with helpful message
fn load_config_file(path: &std::path::Path) -> Result<FileConfig> {
    if !path.exists() {
        anyhow::bail!(
            "Config file '{}' not found.\n\n\
            To get started:\n\
            1. Copy config.toml.example to config.toml\n\
            2. Fill in your database URLs\n\n\
            See config.toml.example for the required format.",
            path.display()
        );
    }

    FileConfig::load(path)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let config = load_config_file(&args.config)?;

    let store = DataStore::connect(&config.database, config.tables.clone()).await?;
    let cache = store.load_all().await?;

    let state = Arc::new(AppState {
        cache,
        dashboard: config.dashboard.clone(),
    });
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.addr).await?;
    info!(addr = %config.server.addr, "dashboard API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
