//! HTTP server implementation using Axum.

use crate::handlers::{
    get_icon, get_icon_manifest, get_icon_status, get_settings, get_shortcuts, get_system_info,
    handle_health, save_settings, save_shortcuts, start_icon_sync,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use warmbos_core::{DesktopConfigStore, DesktopPaths, IconSyncEngine, SystemInfoProvider};

/// Application state shared across handlers.
pub struct AppState {
    /// On-disk layout
    pub paths: DesktopPaths,
    /// Icon library sync engine
    pub icons: Arc<IconSyncEngine>,
    /// Shortcuts and settings documents
    pub config_store: DesktopConfigStore,
    pub system: SystemInfoProvider,
}

impl AppState {
    pub fn new(paths: DesktopPaths, icons: Arc<IconSyncEngine>) -> Self {
        Self {
            config_store: DesktopConfigStore::new(paths.clone()),
            system: SystemInfoProvider::new(),
            paths,
            icons,
        }
    }
}

/// Build the router. Anything not matched by an API route is served from
/// the client directory.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_files = ServeDir::new(state.paths.client_dir());

    Router::new()
        .route("/health", get(handle_health))
        // Icon library
        .route("/api/icons/sync", post(start_icon_sync))
        .route("/api/icons/status", get(get_icon_status))
        .route("/assets/js/icon-manifest.json", get(get_icon_manifest))
        .route("/js/icon-manifest.json", get(get_icon_manifest))
        .route("/icons/*path", get(get_icon))
        // System
        .route("/api/system", get(get_system_info))
        .route("/api/system-info", get(get_system_info))
        // Desktop configuration
        .route("/config/shortcuts.json", get(get_shortcuts).post(save_shortcuts))
        .route("/shortcuts.json", get(get_shortcuts).post(save_shortcuts))
        .route("/config/settings.json", get(get_settings).post(save_settings))
        .route("/settings.json", get(get_settings).post(save_settings))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_server(state: Arc<AppState>, host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Server listening on {}", actual_addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Server error: {}", e);
        }
    });

    Ok(actual_addr)
}
