//! Icon library status reporting.

use super::manifest::Manifest;
use super::sync::SyncProgress;
use crate::config::DesktopPaths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Snapshot of the icon library, computed fresh for every query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconStatus {
    pub assets_present: bool,
    pub manifest_present: bool,
    pub icon_count: usize,
    /// Modification time of the icon directory.
    pub last_sync_time: Option<DateTime<Utc>>,
    pub progress: SyncProgress,
}

impl IconStatus {
    /// Inspect the filesystem. Missing or unreadable state reads as absent.
    pub fn collect(paths: &DesktopPaths, progress: SyncProgress) -> Self {
        let icons_dir = paths.icons_dir();
        let manifest_file = paths.manifest_file();

        let assets_present = icons_dir.is_dir();
        let manifest_present = manifest_file.is_file();
        let icon_count = if manifest_present {
            manifest_icon_count(&manifest_file)
        } else {
            0
        };
        let last_sync_time = if assets_present {
            modified_time(&icons_dir)
        } else {
            None
        };

        Self {
            assets_present,
            manifest_present,
            icon_count,
            last_sync_time,
            progress,
        }
    }
}

fn manifest_icon_count(path: &Path) -> usize {
    match Manifest::load(path) {
        Ok(Some(manifest)) => manifest.total_count,
        Ok(None) => 0,
        Err(e) => {
            debug!("Manifest unreadable, reporting zero icons: {}", e);
            0
        }
    }
}

fn modified_time(path: &Path) -> Option<DateTime<Utc>> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(DateTime::<Utc>::from)
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icons::manifest::ManifestBuilder;
    use crate::icons::sync::SyncPhase;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_fresh_environment() {
        let temp_dir = TempDir::new().unwrap();
        let status = IconStatus::collect(&DesktopPaths::new(temp_dir.path()), SyncProgress::default());

        assert!(!status.assets_present);
        assert!(!status.manifest_present);
        assert_eq!(status.icon_count, 0);
        assert!(status.last_sync_time.is_none());
        assert_eq!(status.progress.phase, SyncPhase::Idle);

        let json = serde_json::to_value(&status).unwrap();
        assert!(json["last_sync_time"].is_null());
        assert_eq!(json["progress"]["phase"], "idle");
    }

    #[test]
    fn test_synced_environment() {
        let temp_dir = TempDir::new().unwrap();
        let paths = DesktopPaths::new(temp_dir.path());
        let icon = paths.icons_dir().join("svg/gitea.svg");
        fs::create_dir_all(icon.parent().unwrap()).unwrap();
        fs::write(&icon, b"<svg/>").unwrap();
        ManifestBuilder::new("icons")
            .build_and_write(&paths.icons_dir(), &paths.manifest_file())
            .unwrap();

        let status = IconStatus::collect(&paths, SyncProgress::new(SyncPhase::Complete, 100, "done"));
        assert!(status.assets_present);
        assert!(status.manifest_present);
        assert_eq!(status.icon_count, 1);
        assert!(status.last_sync_time.is_some());
    }

    #[test]
    fn test_corrupt_manifest_counts_zero() {
        let temp_dir = TempDir::new().unwrap();
        let paths = DesktopPaths::new(temp_dir.path());
        fs::create_dir_all(paths.manifest_file().parent().unwrap()).unwrap();
        fs::write(paths.manifest_file(), "not json").unwrap();

        let status = IconStatus::collect(&paths, SyncProgress::default());
        assert!(status.manifest_present);
        assert_eq!(status.icon_count, 0);
    }
}
