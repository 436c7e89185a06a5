//! Error types for the WarmbOS backend.
//!
//! A single error enum covers the fetch, filesystem and document failures of
//! the library. The HTTP layer maps each variant to a status code through
//! [`WarmbosError::status_code`].

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the WarmbOS library.
#[derive(Debug, Error)]
pub enum WarmbosError {
    // Fetch errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Optional cause description
        cause: Option<String>,
    },

    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Corrupt archive: {message}")]
    CorruptArchive { message: String },

    #[error("Unexpected archive layout: {message}")]
    UnexpectedLayout { message: String },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Path escapes its root directory: {0}")]
    PathTraversal(String),

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Validation errors
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for WarmbOS operations.
pub type Result<T> = std::result::Result<T, WarmbosError>;

impl From<std::io::Error> for WarmbosError {
    fn from(err: std::io::Error) -> Self {
        WarmbosError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for WarmbosError {
    fn from(err: serde_json::Error) -> Self {
        WarmbosError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for WarmbosError {
    fn from(err: reqwest::Error) -> Self {
        // The configured duration isn't known here; callers that have it
        // build `Timeout` themselves.
        let message = if err.is_timeout() {
            format!("Request timed out: {}", err)
        } else {
            err.to_string()
        };
        WarmbosError::Network {
            message,
            cause: err.url().map(|u| u.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for WarmbosError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io) => io.into(),
            other => WarmbosError::CorruptArchive {
                message: other.to_string(),
            },
        }
    }
}

impl WarmbosError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        WarmbosError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a validation error for a document field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        WarmbosError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True for failures raised while obtaining the remote archive
    /// (network, timeout, corrupt archive, unexpected layout).
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            WarmbosError::Network { .. }
                | WarmbosError::Timeout(_)
                | WarmbosError::CorruptArchive { .. }
                | WarmbosError::UnexpectedLayout { .. }
        )
    }

    /// Map to an HTTP status code.
    ///
    /// - 400: validation and bad request paths
    /// - 404: missing files
    /// - 502/504: upstream fetch failures
    /// - 500: everything else
    pub fn status_code(&self) -> u16 {
        match self {
            WarmbosError::Validation { .. } | WarmbosError::PathTraversal(_) => 400,
            WarmbosError::FileNotFound(_) => 404,
            WarmbosError::Network { .. }
            | WarmbosError::CorruptArchive { .. }
            | WarmbosError::UnexpectedLayout { .. } => 502,
            WarmbosError::Timeout(_) => 504,
            _ => 500,
        }
    }
}
