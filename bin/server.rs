// Fridge Manager - Web Server
// JSON API for a browser client, optionally serving the client's static files

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use fridge_manager::config::Config;
use fridge_manager::server::{create_router, AppState};
use fridge_manager::{logging, InventoryStore};

/// Fridge Manager API server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Database file (overrides the config)
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Address to listen on (overrides the config)
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Directory with a browser client to serve at /
    #[arg(long, value_name = "DIR")]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init("info,tower_http=debug");
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let db_path = cli.db.unwrap_or(config.storage.database_path);
    let bind = cli.bind.unwrap_or(config.server.bind_address);
    let static_dir = cli.static_dir.or(config.server.static_dir);

    let store = InventoryStore::open_path(&db_path)?.with_actor("api");
    info!(
        items = store.items().len(),
        db = %db_path.display(),
        "inventory ready"
    );

    let state = AppState::new(store).with_static_dir(static_dir);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind to {}", bind))?;

    info!(address = %bind, "server listening");
    println!("🚀 Fridge Manager API running on http://{}", bind);
    println!("   Items: http://{}/api/items?zone=cold", bind);
    println!("   Press Ctrl+C to stop");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
