//! Icon library synchronization.
//!
//! [`IconSyncEngine`] downloads the upstream icon archive, swaps it in as the
//! live icon directory and regenerates the manifest. Runs are serialized on
//! one async mutex; progress lives behind its own short-held lock so pollers
//! never wait for a run. Every progress change is also broadcast to
//! subscribers.

use super::fetch::{ArchiveSource, HttpArchiveFetcher};
use super::manifest::{Manifest, ManifestBuilder};
use super::status::IconStatus;
use crate::config::{DesktopPaths, IconConfig, IconSyncSettings};
use crate::{Result, WarmbosError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

/// Step of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPhase {
    Idle,
    Downloading,
    Extracting,
    Installing,
    Generating,
    Complete,
    Error,
}

impl SyncPhase {
    /// Position in a run, used to check that phases only move forward.
    pub fn ordinal(&self) -> u8 {
        match self {
            SyncPhase::Idle => 0,
            SyncPhase::Downloading => 1,
            SyncPhase::Extracting => 2,
            SyncPhase::Installing => 3,
            SyncPhase::Generating => 4,
            SyncPhase::Complete | SyncPhase::Error => 5,
        }
    }

    /// `complete` and `error` end a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncPhase::Complete | SyncPhase::Error)
    }
}

/// Progress of the current or last sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncProgress {
    pub phase: SyncPhase,
    /// 0-100.
    pub percent: u8,
    pub message: String,
}

impl SyncProgress {
    pub fn new(phase: SyncPhase, percent: u8, message: impl Into<String>) -> Self {
        Self {
            phase,
            percent: percent.min(100),
            message: message.into(),
        }
    }
}

impl Default for SyncProgress {
    fn default() -> Self {
        Self::new(SyncPhase::Idle, 0, "")
    }
}

const PROGRESS_EVENT_CAPACITY: usize = 64;

/// Owns the icon directory and manifest and keeps them in sync with upstream.
pub struct IconSyncEngine {
    paths: DesktopPaths,
    settings: IconSyncSettings,
    source: Arc<dyn ArchiveSource>,
    builder: ManifestBuilder,
    /// Held for the whole of a run.
    run_lock: Mutex<()>,
    progress: RwLock<SyncProgress>,
    events: broadcast::Sender<SyncProgress>,
}

impl IconSyncEngine {
    /// Create an engine that downloads over HTTP.
    ///
    /// Scratch space goes under [`DesktopPaths::scratch_dir`], on the same
    /// filesystem as the live icon directory but outside the served tree.
    pub fn new(paths: DesktopPaths, settings: IconSyncSettings) -> Result<Self> {
        let fetcher = HttpArchiveFetcher::new(settings.download_timeout)?
            .with_scratch_root(paths.scratch_dir());
        Ok(Self::with_source(paths, settings, Arc::new(fetcher)))
    }

    /// Create an engine backed by an arbitrary archive source.
    pub fn with_source(
        paths: DesktopPaths,
        settings: IconSyncSettings,
        source: Arc<dyn ArchiveSource>,
    ) -> Self {
        let builder = ManifestBuilder::new(settings.public_prefix.clone());
        let (events, _) = broadcast::channel(PROGRESS_EVENT_CAPACITY);
        Self {
            paths,
            settings,
            source,
            builder,
            run_lock: Mutex::new(()),
            progress: RwLock::new(SyncProgress::default()),
            events,
        }
    }

    pub fn paths(&self) -> &DesktopPaths {
        &self.paths
    }

    /// Snapshot of the current progress.
    pub fn progress(&self) -> SyncProgress {
        self.progress
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Receive every progress change from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncProgress> {
        self.events.subscribe()
    }

    fn set_progress(&self, phase: SyncPhase, percent: u8, message: &str) {
        debug!("Icon sync: {:?} {}% {}", phase, percent, message);
        let progress = SyncProgress::new(phase, percent, message);
        *self.progress.write().unwrap_or_else(PoisonError::into_inner) = progress.clone();
        // No subscribers is fine.
        let _ = self.events.send(progress);
    }

    /// Current on-disk state plus progress. Never waits for a running sync.
    pub fn status(&self) -> IconStatus {
        IconStatus::collect(&self.paths, self.progress())
    }

    /// True when the icon directory or the manifest is missing.
    pub fn needs_initial_sync(&self) -> bool {
        !self.paths.icons_dir().exists() || !self.paths.manifest_file().exists()
    }

    /// Run a full sync. Concurrent callers wait their turn.
    ///
    /// Returns whether the run succeeded; failures are reported through
    /// [`IconSyncEngine::progress`].
    pub async fn sync(&self) -> bool {
        let _guard = self.run_lock.lock().await;
        match self.run().await {
            Ok(count) => {
                info!("Icon sync complete: {} icons", count);
                self.set_progress(SyncPhase::Complete, 100, "Icons synchronized successfully!");
                true
            }
            Err(e) => {
                error!("Icon sync failed: {}", e);
                self.set_progress(SyncPhase::Error, 0, &format!("Sync failed: {}", e));
                false
            }
        }
    }

    /// Start a sync on the runtime and return immediately.
    ///
    /// The task handle is dropped: there is no way to cancel the run or to
    /// observe its result other than polling progress.
    pub fn spawn_sync(self: &Arc<Self>) {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            engine.sync().await;
        });
    }

    async fn run(&self) -> Result<usize> {
        self.set_progress(SyncPhase::Downloading, 10, "Downloading icons...");
        self.set_progress(SyncPhase::Downloading, 20, "Downloading repository...");

        let archive = self
            .source
            .fetch(&self.settings.archive_url, &self.settings.archive_dir_prefix)
            .await?;

        // The fetcher unpacks as part of fetching; this checkpoint marks the
        // hand-off to local processing.
        self.set_progress(SyncPhase::Extracting, 40, "Extracting files...");
        debug!(
            "Fetched archive unpacked at {} (scratch {})",
            archive.root().display(),
            archive.scratch_dir().display()
        );

        self.set_progress(SyncPhase::Installing, 60, "Installing icons...");
        let source_dir = archive.root().to_path_buf();
        let icons_dir = self.paths.icons_dir();
        blocking(move || replace_dir(&source_dir, &icons_dir)).await?;
        drop(archive);

        self.set_progress(SyncPhase::Generating, 80, "Generating manifest...");
        let builder = self.builder.clone();
        let icons_dir = self.paths.icons_dir();
        let manifest_file = self.paths.manifest_file();
        let manifest =
            blocking(move || builder.build_and_write(&icons_dir, &manifest_file)).await?;

        Ok(manifest.total_count)
    }

    /// Remove scratch and staging directories left behind by an interrupted
    /// run. Does nothing while a sync holds the run guard.
    ///
    /// Returns the number of entries removed.
    pub fn clear_stale_scratch(&self) -> usize {
        let Ok(_guard) = self.run_lock.try_lock() else {
            debug!("Sync in progress, leaving scratch space alone");
            return 0;
        };

        let mut stale = Vec::new();
        if let Ok(entries) = fs::read_dir(self.paths.scratch_dir()) {
            stale.extend(
                entries
                    .filter_map(|e| e.ok())
                    .filter(|e| {
                        e.file_name()
                            .to_string_lossy()
                            .starts_with(IconConfig::SCRATCH_PREFIX)
                    })
                    .map(|e| e.path()),
            );
        }
        let staging = staging_path(&self.paths.icons_dir());
        if staging.exists() {
            stale.push(staging);
        }

        let mut removed = 0;
        for path in stale {
            match fs::remove_dir_all(&path) {
                Ok(()) => {
                    info!("Removed stale sync scratch {}", path.display());
                    removed += 1;
                }
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
        removed
    }

    /// The persisted manifest, or an empty one when absent or unreadable.
    pub fn manifest_or_empty(&self) -> Manifest {
        match Manifest::load(&self.paths.manifest_file()) {
            Ok(Some(manifest)) => manifest,
            Ok(None) => Manifest::default(),
            Err(e) => {
                warn!("Ignoring unreadable icon manifest: {}", e);
                Manifest::default()
            }
        }
    }

    /// Resolve a request path to a file inside the live icon directory.
    pub fn resolve_icon(&self, relative: &str) -> Result<PathBuf> {
        let icons_dir = self.paths.icons_dir();
        if !icons_dir.is_dir() {
            return Err(WarmbosError::FileNotFound(icons_dir));
        }

        let relative = Path::new(relative);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(WarmbosError::PathTraversal(relative.display().to_string()));
        }

        let path = icons_dir.join(relative);
        if path.is_file() {
            Ok(path)
        } else {
            Err(WarmbosError::FileNotFound(path))
        }
    }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| WarmbosError::Other(format!("Background task failed: {}", e)))?
}

/// Replace `dest` with `source`.
///
/// The new tree is first staged complete beside `dest` (rename, or a copy
/// when `source` is on another filesystem). Only then is the old directory
/// removed and the staged one renamed into place. A failed copy leaves `dest`
/// untouched. Not crash-atomic: a crash between the removal and the final
/// rename leaves `dest` absent until the next sync.
fn replace_dir(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| WarmbosError::io_with_path(e, parent))?;
    }

    let staging = staging_path(dest);
    if staging.exists() {
        fs::remove_dir_all(&staging).map_err(|e| WarmbosError::io_with_path(e, &staging))?;
    }
    stage_dir(source, &staging)?;

    if dest.exists() {
        fs::remove_dir_all(dest).map_err(|e| WarmbosError::io_with_path(e, dest))?;
    }
    fs::rename(&staging, dest).map_err(|e| WarmbosError::io_with_path(e, dest))?;

    info!("Installed icons to {}", dest.display());
    Ok(())
}

/// Sibling of `dest` that holds the next tree while it is being staged.
fn staging_path(dest: &Path) -> PathBuf {
    dest.with_extension("partial")
}

/// Move `source` to `staging`, copying when a rename is not possible.
fn stage_dir(source: &Path, staging: &Path) -> Result<()> {
    let Err(e) = fs::rename(source, staging) else {
        return Ok(());
    };
    // Cross-device moves fail with EXDEV; copy instead.
    debug!("Rename failed, falling back to copy: {}", e);

    if let Err(e) = copy_dir_recursive(source, staging) {
        if staging.exists() {
            if let Err(cleanup) = fs::remove_dir_all(staging) {
                warn!("Failed to remove {}: {}", staging.display(), cleanup);
            }
        }
        return Err(e);
    }
    if let Err(e) = fs::remove_dir_all(source) {
        warn!("Failed to remove {} after copy: {}", source.display(), e);
    }
    Ok(())
}

fn copy_dir_recursive(source: &Path, dest: &Path) -> Result<()> {
    for entry in walkdir::WalkDir::new(source) {
        let entry = entry.map_err(|e| WarmbosError::Io {
            message: e.to_string(),
            path: e.path().map(Path::to_path_buf),
            source: None,
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| WarmbosError::Other(e.to_string()))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| WarmbosError::io_with_path(e, &target))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| WarmbosError::io_with_path(e, &target))?;
        }
    }
    Ok(())
}
