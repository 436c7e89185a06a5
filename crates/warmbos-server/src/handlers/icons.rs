//! Icon library handlers.

use super::ApiResult;
use crate::server::AppState;
use axum::{
    extract::{Path, Request, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::info;
use warmbos_core::{IconStatus, Manifest};

/// Kick off a background sync and answer right away.
pub async fn start_icon_sync(State(state): State<Arc<AppState>>) -> Json<Value> {
    info!("Icon sync requested");
    state.icons.spawn_sync();
    Json(json!({"success": true, "message": "Icon sync started"}))
}

pub async fn get_icon_status(State(state): State<Arc<AppState>>) -> Json<IconStatus> {
    Json(state.icons.status())
}

/// The manifest, or an empty placeholder before the first sync.
pub async fn get_icon_manifest(State(state): State<Arc<AppState>>) -> Json<Manifest> {
    Json(state.icons.manifest_or_empty())
}

pub async fn get_icon(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    request: Request,
) -> ApiResult<Response> {
    let file = state.icons.resolve_icon(&path)?;
    let response = match ServeFile::new(&file).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    Ok(response.into_response())
}
