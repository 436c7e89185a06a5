//! WarmbOS Server - HTTP backend for the WarmbOS web desktop.
//!
//! Serves the static client, the desktop configuration documents, host
//! system information and the icon library, which it keeps in sync with
//! the upstream icon repository.

mod handlers;
mod server;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use warmbos_core::config::{AppConfig, ServerConfig};
use warmbos_core::{DesktopConfigStore, DesktopPaths, IconSyncEngine, IconSyncSettings};

#[derive(Parser, Debug)]
#[command(name = "warmbos-server")]
#[command(about = "HTTP backend for the WarmbOS web desktop")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value_t = ServerConfig::DEFAULT_PORT)]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = ServerConfig::DEFAULT_HOST)]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Root directory holding `client/` (defaults to the current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Override the icon archive URL
    #[arg(long)]
    icons_url: Option<String>,

    /// Do not sync the icon library on startup
    #[arg(long)]
    no_icon_sync: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting {} server v{}", AppConfig::APP_NAME, AppConfig::VERSION);

    let root = match args.root {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    info!("Root directory: {}", root.display());

    let paths = DesktopPaths::new(&root);
    let store = DesktopConfigStore::new(paths.clone());
    store.ensure_directory_structure()?;
    store.create_default_files()?;

    let mut settings = IconSyncSettings::default();
    if let Some(url) = args.icons_url {
        settings.archive_url = url;
    }
    let icons = Arc::new(IconSyncEngine::new(paths.clone(), settings)?);
    let cleared = icons.clear_stale_scratch();
    if cleared > 0 {
        info!("Cleared {} leftover sync directories", cleared);
    }

    if args.no_icon_sync {
        info!("Startup icon sync disabled");
    } else if icons.needs_initial_sync() {
        info!("Icon library missing, starting initial sync");
        icons.spawn_sync();
    }

    let state = Arc::new(server::AppState::new(paths, icons));
    let addr = server::start_server(state, &args.host, args.port).await?;

    // Intentional stdout: wrappers and tests read the bound port from here.
    println!("SERVER_PORT={}", addr.port());

    info!("Server running on {}", addr);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
