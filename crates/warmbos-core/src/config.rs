//! Centralized configuration for the WarmbOS backend.
//!
//! Constants for the server, the icon library, network operations and the
//! on-disk layout, plus the runtime structs built from them.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    pub const APP_NAME: &'static str = "WarmbOS";
    pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");
}

/// HTTP server defaults.
pub struct ServerConfig;

impl ServerConfig {
    pub const DEFAULT_HOST: &'static str = "0.0.0.0";
    pub const DEFAULT_PORT: u16 = 5000;
}

/// Icon library configuration.
pub struct IconConfig;

impl IconConfig {
    pub const REPO_ARCHIVE_URL: &'static str =
        "https://github.com/selfhst/icons/archive/refs/heads/main.zip";
    /// GitHub branch archives unpack to `<repo>-<branch>/`.
    pub const ARCHIVE_DIR_PREFIX: &'static str = "icons-";
    /// URL prefix under which icon files are served.
    pub const PUBLIC_PREFIX: &'static str = "icons";
    pub const SCRATCH_PREFIX: &'static str = ".icon-sync-";
}

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
    /// Upper bound for the whole archive download.
    pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);
    pub const USER_AGENT: &'static str = concat!("warmbos/", env!("CARGO_PKG_VERSION"));
}

/// Directory and file names relative to the root directory.
pub struct PathsConfig;

impl PathsConfig {
    pub const CLIENT_DIR_NAME: &'static str = "client";
    pub const CONFIG_DIR_NAME: &'static str = "config";
    pub const ASSETS_DIR_NAME: &'static str = "assets";
    pub const ICONS_DIR_NAME: &'static str = "icons";
    pub const JS_DIR_NAME: &'static str = "js";
    pub const CSS_DIR_NAME: &'static str = "css";
    pub const APPS_DIR_NAME: &'static str = "apps";
    pub const COMPONENTS_DIR_NAME: &'static str = "components";
    pub const MANIFEST_FILENAME: &'static str = "icon-manifest.json";
    pub const SHORTCUTS_FILENAME: &'static str = "shortcuts.json";
    pub const SETTINGS_FILENAME: &'static str = "settings.json";
    pub const SCRATCH_DIR_NAME: &'static str = ".icon-sync";
}

/// Resolved on-disk layout, rooted at one directory.
#[derive(Debug, Clone)]
pub struct DesktopPaths {
    root: PathBuf,
}

impl DesktopPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Static client assets.
    pub fn client_dir(&self) -> PathBuf {
        self.root.join(PathsConfig::CLIENT_DIR_NAME)
    }

    pub fn config_dir(&self) -> PathBuf {
        self.client_dir().join(PathsConfig::CONFIG_DIR_NAME)
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.client_dir().join(PathsConfig::ASSETS_DIR_NAME)
    }

    /// Live icon asset directory.
    pub fn icons_dir(&self) -> PathBuf {
        self.assets_dir().join(PathsConfig::ICONS_DIR_NAME)
    }

    pub fn manifest_file(&self) -> PathBuf {
        self.assets_dir()
            .join(PathsConfig::JS_DIR_NAME)
            .join(PathsConfig::MANIFEST_FILENAME)
    }

    /// Scratch space for icon syncs. Lives beside `client/`, never inside
    /// it, so partial downloads are not served.
    pub fn scratch_dir(&self) -> PathBuf {
        self.root.join(PathsConfig::SCRATCH_DIR_NAME)
    }

    pub fn shortcuts_file(&self) -> PathBuf {
        self.config_dir().join(PathsConfig::SHORTCUTS_FILENAME)
    }

    pub fn settings_file(&self) -> PathBuf {
        self.config_dir().join(PathsConfig::SETTINGS_FILENAME)
    }

    /// Directories created on startup. The icon directory is left to the
    /// sync engine so its absence keeps meaning "never synced".
    pub fn required_dirs(&self) -> Vec<PathBuf> {
        let assets = self.assets_dir();
        vec![
            self.config_dir(),
            assets.join(PathsConfig::CSS_DIR_NAME),
            assets.join(PathsConfig::JS_DIR_NAME),
            self.client_dir().join(PathsConfig::COMPONENTS_DIR_NAME),
            self.client_dir().join(PathsConfig::APPS_DIR_NAME),
        ]
    }
}

/// Runtime settings for icon library synchronization.
#[derive(Debug, Clone)]
pub struct IconSyncSettings {
    /// Archive to download.
    pub archive_url: String,
    /// Required name prefix of the archive's top-level directory.
    pub archive_dir_prefix: String,
    /// URL prefix written into manifest paths (`/<prefix>/...`).
    pub public_prefix: String,
    /// Timeout for the full download.
    pub download_timeout: Duration,
}

impl Default for IconSyncSettings {
    fn default() -> Self {
        Self {
            archive_url: IconConfig::REPO_ARCHIVE_URL.to_string(),
            archive_dir_prefix: IconConfig::ARCHIVE_DIR_PREFIX.to_string(),
            public_prefix: IconConfig::PUBLIC_PREFIX.to_string(),
            download_timeout: NetworkConfig::DOWNLOAD_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_paths_layout() {
        let paths = DesktopPaths::new("/srv/warmbos");
        assert_eq!(paths.icons_dir(), Path::new("/srv/warmbos/client/assets/icons"));
        assert_eq!(
            paths.manifest_file(),
            Path::new("/srv/warmbos/client/assets/js/icon-manifest.json")
        );
        assert_eq!(
            paths.settings_file(),
            Path::new("/srv/warmbos/client/config/settings.json")
        );
        assert!(!paths.required_dirs().contains(&paths.icons_dir()));
        assert!(paths.required_dirs().contains(&paths.config_dir()));
    }

    #[test]
    fn test_scratch_dir_outside_served_tree() {
        let paths = DesktopPaths::new("/srv/warmbos");
        assert_eq!(paths.scratch_dir(), Path::new("/srv/warmbos/.icon-sync"));
        assert!(!paths.scratch_dir().starts_with(paths.client_dir()));
    }

    #[test]
    fn test_default_sync_settings() {
        let settings = IconSyncSettings::default();
        assert!(settings.archive_url.ends_with("main.zip"));
        assert_eq!(settings.archive_dir_prefix, "icons-");
        assert_eq!(settings.public_prefix, "icons");
    }
}
