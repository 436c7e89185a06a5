//! Icon library: upstream sync, categorization and the searchable manifest.
//!
//! The pipeline is `ArchiveSource::fetch` → directory swap →
//! `ManifestBuilder::build`, driven by [`IconSyncEngine`].

mod categorize;
mod fetch;
mod manifest;
mod status;
mod sync;

pub use categorize::{categorize, display_name, CATEGORY_TABLE, MISC_CATEGORY};
pub use fetch::{ArchiveSource, FetchedArchive, HttpArchiveFetcher};
pub use manifest::{IconKind, IconRecord, Manifest, ManifestBuilder};
pub use status::IconStatus;
pub use sync::{IconSyncEngine, SyncPhase, SyncProgress};
