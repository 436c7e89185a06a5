//! Desktop configuration handlers.

use super::ApiResult;
use crate::server::AppState;
use axum::{body::Bytes, extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use warmbos_core::WarmbosError;

pub async fn get_shortcuts(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    Ok(Json(state.config_store.load_shortcuts()?))
}

pub async fn save_shortcuts(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let data = parse_body(&body)?;
    state.config_store.save_shortcuts(&data)?;
    info!("Shortcuts saved");
    Ok(Json(json!({"success": true})))
}

pub async fn get_settings(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    Ok(Json(state.config_store.load_settings()?))
}

pub async fn save_settings(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let data = parse_body(&body)?;
    state.config_store.save_settings(&data)?;
    info!("Settings saved");
    Ok(Json(json!({"success": true})))
}

/// Accept any content type; an empty or malformed body is a client error.
fn parse_body(body: &[u8]) -> Result<Value, WarmbosError> {
    serde_json::from_slice(body).map_err(|_| WarmbosError::validation("body", "No data provided"))
}
