//! HTTP request handlers, split by domain.

mod config;
mod icons;
mod system;

pub use config::{get_settings, get_shortcuts, save_settings, save_shortcuts};
pub use icons::{get_icon, get_icon_manifest, get_icon_status, start_icon_sync};
pub use system::get_system_info;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};
use warmbos_core::WarmbosError;

/// Library error rendered as `{"error": "..."}` with a matching status code.
#[derive(Debug)]
pub struct ApiError(pub WarmbosError);

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<WarmbosError> for ApiError {
    fn from(err: WarmbosError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = match &self.0 {
            WarmbosError::Validation { message, .. } => message.clone(),
            WarmbosError::FileNotFound(_) => "Not found".to_string(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Health check endpoint.
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}
