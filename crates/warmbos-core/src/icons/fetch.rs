//! Remote archive fetching and unpacking.
//!
//! The fetcher downloads the icon archive into scratch space, unpacks it and
//! checks that it contains a single top-level directory with the expected
//! prefix. It never touches the live asset directory.

use crate::config::NetworkConfig;
use crate::{Result, WarmbosError};
use async_trait::async_trait;
use futures::StreamExt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Unpacked archive living in scratch space.
///
/// Dropping the handle deletes everything still inside the scratch directory,
/// so callers move [`FetchedArchive::root`] out before letting it go.
#[derive(Debug)]
pub struct FetchedArchive {
    scratch: TempDir,
    root: PathBuf,
}

impl FetchedArchive {
    /// Wrap an unpacked directory that lives inside `scratch`.
    pub fn new(scratch: TempDir, root: PathBuf) -> Self {
        Self { scratch, root }
    }

    /// The archive's top-level directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }
}

/// Source of icon archives.
#[async_trait]
pub trait ArchiveSource: Send + Sync {
    /// Download and unpack `url`, returning the top-level directory whose
    /// name starts with `expected_prefix`.
    async fn fetch(&self, url: &str, expected_prefix: &str) -> Result<FetchedArchive>;
}

/// Fetches zip archives over HTTP(S).
pub struct HttpArchiveFetcher {
    client: reqwest::Client,
    timeout: Duration,
    scratch_root: Option<PathBuf>,
}

impl HttpArchiveFetcher {
    /// Create a fetcher whose whole download is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(NetworkConfig::CONNECT_TIMEOUT)
            .timeout(timeout)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| WarmbosError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                cause: None,
            })?;

        Ok(Self {
            client,
            timeout,
            scratch_root: None,
        })
    }

    /// Create scratch directories under `dir` instead of the system temp dir.
    ///
    /// Keeping scratch on the same filesystem as the live directory lets the
    /// install step rename instead of copy.
    pub fn with_scratch_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(dir.into());
        self
    }

    fn create_scratch(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(crate::config::IconConfig::SCRATCH_PREFIX);
        match &self.scratch_root {
            Some(dir) => {
                std::fs::create_dir_all(dir).map_err(|e| WarmbosError::io_with_path(e, dir))?;
                builder
                    .tempdir_in(dir)
                    .map_err(|e| WarmbosError::io_with_path(e, dir))
            }
            None => builder.tempdir().map_err(WarmbosError::from),
        }
    }

    fn request_error(&self, err: reqwest::Error) -> WarmbosError {
        if err.is_timeout() {
            WarmbosError::Timeout(self.timeout)
        } else {
            err.into()
        }
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        info!("Downloading icon archive from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(WarmbosError::Network {
                message: format!("Download of {} failed with status {}", url, status),
                cause: None,
            });
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| WarmbosError::io_with_path(e, dest))?;

        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.request_error(e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| WarmbosError::io_with_path(e, dest))?;
            downloaded += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| WarmbosError::io_with_path(e, dest))?;

        info!("Download complete: {} bytes", downloaded);
        Ok(downloaded)
    }
}

#[async_trait]
impl ArchiveSource for HttpArchiveFetcher {
    async fn fetch(&self, url: &str, expected_prefix: &str) -> Result<FetchedArchive> {
        let scratch = self.create_scratch()?;
        let archive_path = scratch.path().join("archive.zip");

        self.download(url, &archive_path).await?;

        let extract_dir = scratch.path().join("extract");
        let prefix = expected_prefix.to_string();
        let root = tokio::task::spawn_blocking(move || {
            unpack_archive(&archive_path, &extract_dir, &prefix)
        })
        .await
        .map_err(|e| WarmbosError::Other(format!("Extraction task failed: {}", e)))??;

        Ok(FetchedArchive::new(scratch, root))
    }
}

/// Extract `archive_path` into `extract_dir` and locate its top-level directory.
pub(crate) fn unpack_archive(
    archive_path: &Path,
    extract_dir: &Path,
    expected_prefix: &str,
) -> Result<PathBuf> {
    extract_zip(archive_path, extract_dir)?;
    let root = find_extracted_dir(extract_dir, expected_prefix)?;
    // The archive file is no longer needed once unpacked.
    if let Err(e) = std::fs::remove_file(archive_path) {
        debug!("Could not remove {}: {}", archive_path.display(), e);
    }
    Ok(root)
}

fn extract_zip(archive_path: &Path, extract_dir: &Path) -> Result<()> {
    debug!("Extracting {} to {}", archive_path.display(), extract_dir.display());

    let file = File::open(archive_path).map_err(|e| WarmbosError::io_with_path(e, archive_path))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| WarmbosError::CorruptArchive {
        message: format!("Invalid zip archive: {}", e),
    })?;

    std::fs::create_dir_all(extract_dir).map_err(|e| WarmbosError::io_with_path(e, extract_dir))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| WarmbosError::CorruptArchive {
            message: format!("Failed to read zip entry {}: {}", i, e),
        })?;

        // Entries with absolute or `..` paths are skipped.
        let outpath = match entry.enclosed_name() {
            Some(path) => extract_dir.join(path),
            None => continue,
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)
                .map_err(|e| WarmbosError::io_with_path(e, &outpath))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent).map_err(|e| WarmbosError::io_with_path(e, parent))?;
        }
        let mut outfile =
            File::create(&outpath).map_err(|e| WarmbosError::io_with_path(e, &outpath))?;
        std::io::copy(&mut entry, &mut outfile).map_err(|e| {
            if e.kind() == std::io::ErrorKind::InvalidData {
                WarmbosError::CorruptArchive {
                    message: format!("Failed to decompress {}: {}", entry.name(), e),
                }
            } else {
                WarmbosError::io_with_path(e, &outpath)
            }
        })?;
    }

    Ok(())
}

/// The extract directory must hold exactly one entry: a directory named
/// `<prefix>*`.
fn find_extracted_dir(extract_dir: &Path, expected_prefix: &str) -> Result<PathBuf> {
    let entries: Vec<PathBuf> = std::fs::read_dir(extract_dir)
        .map_err(|e| WarmbosError::io_with_path(e, extract_dir))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();

    match entries.as_slice() {
        [only]
            if only.is_dir()
                && only
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(expected_prefix)) =>
        {
            Ok(only.clone())
        }
        [] => Err(WarmbosError::UnexpectedLayout {
            message: "archive is empty".to_string(),
        }),
        _ => Err(WarmbosError::UnexpectedLayout {
            message: format!(
                "expected a single top-level directory starting with '{}', found {} entries",
                expected_prefix,
                entries.len()
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, files: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, data) in files {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_unpack_finds_prefixed_directory() {
        let scratch = TempDir::new().unwrap();
        let archive = scratch.path().join("archive.zip");
        write_zip(
            &archive,
            &[
                ("icons-main/svg/terminal.svg", b"<svg/>"),
                ("icons-main/png/mail.png", b"png"),
            ],
        );

        let root = unpack_archive(&archive, &scratch.path().join("extract"), "icons-").unwrap();
        assert!(root.ends_with("icons-main"));
        assert!(root.join("svg/terminal.svg").is_file());
        assert!(!archive.exists());
    }

    #[test]
    fn test_unpack_rejects_wrong_prefix() {
        let scratch = TempDir::new().unwrap();
        let archive = scratch.path().join("archive.zip");
        write_zip(&archive, &[("other-main/a.svg", b"<svg/>")]);

        let err = unpack_archive(&archive, &scratch.path().join("extract"), "icons-").unwrap_err();
        assert!(matches!(err, WarmbosError::UnexpectedLayout { .. }));
    }

    #[test]
    fn test_unpack_rejects_multiple_top_level_entries() {
        let scratch = TempDir::new().unwrap();
        let archive = scratch.path().join("archive.zip");
        write_zip(
            &archive,
            &[("icons-main/a.svg", b"<svg/>"), ("README.md", b"readme")],
        );

        let err = unpack_archive(&archive, &scratch.path().join("extract"), "icons-").unwrap_err();
        assert!(matches!(err, WarmbosError::UnexpectedLayout { .. }));
    }

    #[test]
    fn test_unpack_rejects_corrupt_archive() {
        let scratch = TempDir::new().unwrap();
        let archive = scratch.path().join("archive.zip");
        std::fs::write(&archive, b"this is not a zip file").unwrap();

        let err = unpack_archive(&archive, &scratch.path().join("extract"), "icons-").unwrap_err();
        assert!(matches!(err, WarmbosError::CorruptArchive { .. }));
        assert!(err.is_fetch_error());
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_network_error() {
        let fetcher = HttpArchiveFetcher::new(Duration::from_secs(5)).unwrap();
        // Port 9 (discard) on loopback is closed on test machines.
        let err = fetcher
            .fetch("http://127.0.0.1:9/icons.zip", "icons-")
            .await
            .unwrap_err();
        assert!(err.is_fetch_error());
    }

    #[test]
    fn test_scratch_root_is_used() {
        let dir = TempDir::new().unwrap();
        let fetcher = HttpArchiveFetcher::new(Duration::from_secs(5))
            .unwrap()
            .with_scratch_root(dir.path().join("scratch"));
        let scratch = fetcher.create_scratch().unwrap();
        assert!(scratch.path().starts_with(dir.path().join("scratch")));
    }
}
