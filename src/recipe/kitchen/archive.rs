// src/recipe/kitchen/archive.rs

//! Source archive download, verification and extraction

use crate::error::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::process::{CommandSpec, ProcessRunner};

/// Buffer size for streaming downloads (8 KB)
const STREAM_BUFFER_SIZE: usize = 8192;

/// An upstream source archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub url: String,
    /// Local file name for the download; its extension selects the extractor
    pub filename: String,
    /// Pinned SHA-256 digest (hex); `None` disables verification
    pub sha256: Option<String>,
}

/// Downloads a source archive and extracts it into a directory
pub trait SourceFetcher: Send + Sync {
    fn fetch(&self, source: &SourceSpec, dest: &Path) -> Result<()>;
}

/// Archive formats the Kitchen can extract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
    TarXz,
    TarBz2,
    Tar,
}

impl ArchiveFormat {
    /// Detect the format from a file name
    pub fn detect(filename: &str) -> Result<Self> {
        if filename.ends_with(".zip") {
            Ok(Self::Zip)
        } else if filename.ends_with(".tar.gz") || filename.ends_with(".tgz") {
            Ok(Self::TarGz)
        } else if filename.ends_with(".tar.xz") || filename.ends_with(".txz") {
            Ok(Self::TarXz)
        } else if filename.ends_with(".tar.bz2") || filename.ends_with(".tbz2") {
            Ok(Self::TarBz2)
        } else if filename.ends_with(".tar") {
            Ok(Self::Tar)
        } else {
            Err(Error::UnsupportedArchive(filename.to_string()))
        }
    }

    /// Extraction command for `archive` into `dest`
    pub fn extract_command(&self, archive: &Path, dest: &Path) -> CommandSpec {
        let archive = archive.to_string_lossy();
        let dest = dest.to_string_lossy();
        let (archive, dest): (&str, &str) = (&archive, &dest);
        match self {
            Self::Zip => CommandSpec::new("unzip").args(["-q", "-o", archive, "-d", dest]),
            Self::TarGz => CommandSpec::new("tar").args(["-xzf", archive, "-C", dest]),
            Self::TarXz => CommandSpec::new("tar").args(["-xJf", archive, "-C", dest]),
            Self::TarBz2 => CommandSpec::new("tar").args(["-xjf", archive, "-C", dest]),
            Self::Tar => CommandSpec::new("tar").args(["-xf", archive, "-C", dest]),
        }
    }
}

/// Extract an archive into an existing directory
pub fn extract_archive(runner: &dyn ProcessRunner, archive: &Path, dest: &Path) -> Result<()> {
    let filename = archive
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    let format = ArchiveFormat::detect(filename)?;
    runner.run(&format.extract_command(archive, dest))?;
    Ok(())
}

/// SHA-256 of a file, hex encoded
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; STREAM_BUFFER_SIZE];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Check a file against a pinned SHA-256 digest
///
/// Accepts the digest bare or with a `sha256:` prefix.
pub fn verify_sha256(path: &Path, expected: &str) -> Result<()> {
    let expected = expected.strip_prefix("sha256:").unwrap_or(expected).to_ascii_lowercase();
    if expected.len() != 64 || !expected.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::ParseError(format!(
            "Invalid sha256 digest '{}'",
            expected
        )));
    }

    let actual = sha256_file(path)?;
    if actual != expected {
        return Err(Error::ChecksumMismatch { expected, actual });
    }
    Ok(())
}

/// Fetches sources over HTTP(S) and extracts them with `unzip`/`tar`
pub struct HttpFetcher {
    client: Client,
    download_dir: PathBuf,
    runner: Arc<dyn ProcessRunner>,
    show_progress: bool,
}

impl HttpFetcher {
    /// Create a fetcher that keeps downloads in `download_dir`
    pub fn new(download_dir: PathBuf, runner: Arc<dyn ProcessRunner>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("glfw-recipe/", env!("CARGO_PKG_VERSION")))
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| Error::DownloadError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            download_dir,
            runner,
            show_progress: false,
        })
    }

    /// Show a progress bar while downloading
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Download `url` to `dest` in a single attempt
    pub fn download(&self, url: &str, dest: &Path) -> Result<()> {
        info!("Downloading: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::DownloadError(format!("Failed to fetch {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::DownloadError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let total_size = response.content_length().unwrap_or(0);
        let progress = self.show_progress.then(|| {
            let pb = ProgressBar::new(total_size);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{msg} [{bar:40}] {bytes}/{total_bytes}")
            {
                pb.set_style(style.progress_chars("=> "));
            }
            pb
        });

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = dest.with_extension("part");
        let mut file = File::create(&temp_path)?;

        let display_name = dest
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let downloaded =
            stream_response_to_file(response, &mut file, progress.as_ref(), &display_name);

        if let Some(pb) = &progress {
            pb.finish_and_clear();
        }

        match downloaded {
            Ok(bytes) => {
                debug!("Downloaded {} bytes", bytes);
                fs::rename(&temp_path, dest)?;
                Ok(())
            }
            Err(e) => {
                let _ = fs::remove_file(&temp_path);
                Err(e)
            }
        }
    }
}

impl SourceFetcher for HttpFetcher {
    fn fetch(&self, source: &SourceSpec, dest: &Path) -> Result<()> {
        let archive = self.download_dir.join(&source.filename);
        self.download(&source.url, &archive)?;

        match &source.sha256 {
            Some(expected) => {
                if let Err(e) = verify_sha256(&archive, expected) {
                    let _ = fs::remove_file(&archive);
                    return Err(e);
                }
                debug!("Checksum verified for {}", source.filename);
            }
            None => warn!(
                "No sha256 pinned for {}; extracting unverified source",
                source.filename
            ),
        }

        fs::create_dir_all(dest)?;
        info!("Extracting {} to {}", source.filename, dest.display());
        extract_archive(self.runner.as_ref(), &archive, dest)
    }
}

/// Stream an HTTP response body to a file
fn stream_response_to_file(
    mut response: reqwest::blocking::Response,
    file: &mut File,
    progress_bar: Option<&ProgressBar>,
    display_name: &str,
) -> Result<u64> {
    if let Some(pb) = progress_bar {
        pb.set_message(display_name.to_string());
    }

    let mut downloaded: u64 = 0;
    let mut buffer = [0u8; STREAM_BUFFER_SIZE];

    loop {
        let bytes_read = match response.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::DownloadError(format!("Failed to read response: {e}"))),
        };

        file.write_all(&buffer[..bytes_read])?;
        downloaded += bytes_read as u64;

        if let Some(pb) = progress_bar {
            pb.set_position(downloaded);
        }
    }

    file.flush()?;
    Ok(downloaded)
}
