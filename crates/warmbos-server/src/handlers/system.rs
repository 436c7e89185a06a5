//! System information handler.

use super::ApiResult;
use crate::server::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;
use warmbos_core::{SystemInfo, WarmbosError};

pub async fn get_system_info(State(state): State<Arc<AppState>>) -> ApiResult<Json<SystemInfo>> {
    let provider = state.system;
    let root = state.paths.root().to_path_buf();
    // sysinfo reads /proc and friends synchronously.
    let info = tokio::task::spawn_blocking(move || provider.snapshot(&root))
        .await
        .map_err(|e| WarmbosError::Other(format!("System info task failed: {}", e)))?;
    Ok(Json(info))
}
