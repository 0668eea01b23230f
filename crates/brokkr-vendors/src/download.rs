//! Artifact download with retry and partial-file cleanup
//!
//! The retry policy is a fixed attempt count with no backoff and no
//! distinction between retryable and non-retryable failures. Exhausted
//! retries report `false` instead of raising so the orchestrator can record
//! a per-vendor failure without aborting the batch.

use brokkr_core::Result;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Chunk size for hashing cached artifacts (1MB)
const HASH_CHUNK_SIZE: usize = 1024 * 1024;

/// HTTP timeout for artifact downloads
const DOWNLOAD_TIMEOUT_SECS: u64 = 600;

/// Streaming downloader for vendor artifacts
pub struct Downloader {
    client: reqwest::Client,
    show_progress: bool,
}

impl Downloader {
    /// Create a downloader with the default client configuration
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("brokkr/", env!("CARGO_PKG_VERSION")))
                .timeout(std::time::Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
                .build()
                .expect("Failed to create HTTP client"),
            show_progress: true,
        }
    }

    /// Enable or disable progress bars
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Download `url` to `dest`, retrying up to `max_retries` times
    ///
    /// Performs exactly `max_retries` attempts when every attempt fails.
    /// On every failure path the partial file is removed; `dest` only ever
    /// appears fully written.
    pub async fn download(&self, url: &str, dest: &Path, max_retries: u32) -> bool {
        for attempt in 1..=max_retries {
            match self.attempt(url, dest, attempt).await {
                Ok(()) => {
                    debug!("Downloaded {} -> {}", url, dest.display());
                    return true;
                }
                Err(e) => {
                    warn!(
                        "Download attempt {}/{} failed for {}: {:#}",
                        attempt, max_retries, url, e
                    );
                }
            }
        }
        false
    }

    /// A single download attempt, streaming into a `.part` file
    async fn attempt(&self, url: &str, dest: &Path, attempt: u32) -> anyhow::Result<()> {
        use anyhow::{bail, Context};

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).context("Failed to create download directory")?;
        }

        let part_path = partial_path(dest);
        let mut guard = PartialFile::new(part_path.clone());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send download request")?;

        if !response.status().is_success() {
            bail!("Download failed with status: {}", response.status());
        }

        let total_size = response.content_length().unwrap_or(0);

        let progress = if self.show_progress {
            let pb = ProgressBar::new(total_size);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
                    .expect("Invalid progress bar template")
                    .progress_chars("#>-"),
            );
            let name = dest
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| url.to_string());
            pb.set_message(format!("Downloading {} (attempt {})", name, attempt));
            Some(pb)
        } else {
            None
        };

        let mut file = File::create(&part_path).context("Failed to create partial file")?;
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk: bytes::Bytes = chunk_result.context("Failed to read download chunk")?;
            file.write_all(&chunk)
                .context("Failed to write to partial file")?;
            downloaded += chunk.len() as u64;
            if let Some(pb) = &progress {
                pb.set_position(downloaded);
            }
        }

        file.sync_all().context("Failed to flush partial file")?;
        drop(file);

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        fs::rename(&part_path, dest).context("Failed to move download into place")?;
        guard.disarm();
        Ok(())
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}

/// Sibling path the response body is streamed into before the final rename
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Scoped cleanup for the in-flight partial file
///
/// Success, error, and retry exhaustion all route through `Drop`, so no
/// exit path can leave a partial artifact behind.
struct PartialFile {
    path: PathBuf,
    armed: bool,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.armed && self.path.exists() {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Calculate the SHA256 of a file, reading in chunks
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HASH_CHUNK_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
