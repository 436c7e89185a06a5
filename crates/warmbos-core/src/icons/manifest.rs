//! Icon manifest model and builder.
//!
//! The manifest is the catalog the web UI searches when picking shortcut
//! icons. It is rebuilt from scratch after every sync.

use super::categorize::{categorize, display_name};
use crate::atomic::{atomic_write_json, read_json};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Icon file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconKind {
    Svg,
    Png,
}

impl IconKind {
    /// Match a file extension, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("svg") {
            Some(IconKind::Svg)
        } else if ext.eq_ignore_ascii_case("png") {
            Some(IconKind::Png)
        } else {
            None
        }
    }
}

/// One icon in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconRecord {
    /// Display name derived from the stem.
    pub name: String,
    /// File stem.
    pub filename: String,
    /// Public URL, `/<prefix>/<relative path>`.
    pub path: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: IconKind,
}

/// Catalog of every icon, flat and grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub categories: BTreeMap<String, Vec<IconRecord>>,
    pub icons: Vec<IconRecord>,
    pub total_count: usize,
}

impl Manifest {
    /// Group and sort records into a manifest.
    ///
    /// Sorting is stable, so records sharing a name keep their input order.
    pub fn from_records(mut icons: Vec<IconRecord>) -> Self {
        let mut categories: BTreeMap<String, Vec<IconRecord>> = BTreeMap::new();
        for icon in &icons {
            categories
                .entry(icon.category.clone())
                .or_default()
                .push(icon.clone());
        }

        for bucket in categories.values_mut() {
            bucket.sort_by(|a, b| a.name.cmp(&b.name));
        }
        icons.sort_by(|a, b| a.name.cmp(&b.name));

        Manifest {
            total_count: icons.len(),
            categories,
            icons,
        }
    }

    /// Load a manifest from disk. `None` when the file doesn't exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        read_json(path)
    }

    /// Overwrite the manifest file at `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        atomic_write_json(path, self)?;
        info!(
            "Wrote icon manifest with {} icons to {}",
            self.total_count,
            path.display()
        );
        Ok(())
    }
}

/// Walks an icon tree and produces a [`Manifest`].
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    public_prefix: String,
}

impl ManifestBuilder {
    pub fn new(public_prefix: impl Into<String>) -> Self {
        Self {
            public_prefix: public_prefix.into().trim_matches('/').to_string(),
        }
    }

    /// Scan `asset_root` for SVG and PNG files.
    ///
    /// Entries that can't be read or relativized are logged and skipped.
    pub fn build(&self, asset_root: &Path) -> Manifest {
        info!("Scanning icons in {}", asset_root.display());

        let mut svgs = Vec::new();
        let mut pngs = Vec::new();

        for entry in WalkDir::new(asset_root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", asset_root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let kind = match entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .and_then(IconKind::from_extension)
            {
                Some(kind) => kind,
                None => continue,
            };

            match self.record_for(asset_root, entry.path(), kind) {
                Some(record) if kind == IconKind::Svg => svgs.push(record),
                Some(record) => pngs.push(record),
                None => continue,
            }
        }

        svgs.extend(pngs);
        let manifest = Manifest::from_records(svgs);
        info!("Generated manifest with {} icons", manifest.total_count);
        for icon in manifest.icons.iter().take(5) {
            debug!("Sample icon path {}: {}", icon.name, icon.path);
        }
        manifest
    }

    /// Build and persist in one step.
    pub fn build_and_write(&self, asset_root: &Path, manifest_path: &Path) -> Result<Manifest> {
        let manifest = self.build(asset_root);
        manifest.write(manifest_path)?;
        Ok(manifest)
    }

    fn record_for(&self, asset_root: &Path, path: &Path, kind: IconKind) -> Option<IconRecord> {
        let relative = match path.strip_prefix(asset_root) {
            Ok(relative) => relative,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                return None;
            }
        };

        let Some(relative) = to_url_path(relative) else {
            warn!("Skipping {}: path is not valid UTF-8", path.display());
            return None;
        };
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            warn!("Skipping {}: file name is not valid UTF-8", path.display());
            return None;
        };

        Some(IconRecord {
            name: display_name(stem),
            filename: stem.to_string(),
            path: format!("/{}/{}", self.public_prefix, relative),
            category: categorize(stem).to_string(),
            kind,
        })
    }
}

/// Join path components with `/` regardless of the host separator.
fn to_url_path(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            _ => return None,
        }
    }
    Some(parts.join("/"))
}
