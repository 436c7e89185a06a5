//! WarmbOS Core - Headless library behind the WarmbOS web desktop.
//!
//! This crate keeps a local copy of an upstream icon set in sync, catalogs it
//! into a searchable manifest, persists the desktop configuration documents
//! and reports host system information. It has no HTTP layer of its own; see
//! the `warmbos-server` crate for that.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use warmbos_core::{DesktopPaths, IconSyncEngine, IconSyncSettings};
//!
//! #[tokio::main]
//! async fn main() -> warmbos_core::Result<()> {
//!     let paths = DesktopPaths::new("/srv/warmbos");
//!     let engine = Arc::new(IconSyncEngine::new(paths, IconSyncSettings::default())?);
//!
//!     if engine.sync().await {
//!         println!("{} icons installed", engine.status().icon_count);
//!     }
//!     Ok(())
//! }
//! ```

pub mod atomic;
pub mod config;
pub mod desktop;
pub mod error;
pub mod icons;
pub mod system;

// Re-export commonly used types
pub use config::{DesktopPaths, IconSyncSettings};
pub use desktop::DesktopConfigStore;
pub use error::{Result, WarmbosError};
pub use icons::{
    ArchiveSource, FetchedArchive, HttpArchiveFetcher, IconKind, IconRecord, IconStatus,
    IconSyncEngine, Manifest, ManifestBuilder, SyncPhase, SyncProgress,
};
pub use system::{SystemInfo, SystemInfoProvider};
