//! Streaming archive download.

use crate::constants::model::{CONNECT_TIMEOUT_SECS, DOWNLOAD_TIMEOUT_SECS};
use crate::error::{Error, Result};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Outcome of a completed download.
#[derive(Debug, Clone)]
pub struct Downloaded {
    /// Bytes written to disk.
    pub bytes: u64,
    /// Lowercase hex SHA-256 of the downloaded content.
    pub sha256: String,
}

/// Build the HTTP client used for model downloads.
pub fn http_client() -> reqwest::Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .build()
}

/// Download `url` into `dest` with a progress bar, hashing as it streams.
pub async fn download_file(client: &Client, url: &str, dest: &Path) -> Result<Downloaded> {
    let failed = |e: Box<dyn std::error::Error + Send + Sync>| Error::DownloadFailed {
        url: url.to_string(),
        source: e,
    };
    let write_failed = |e: std::io::Error| Error::ArchiveWrite {
        path: dest.to_path_buf(),
        source: e,
    };

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| failed(Box::new(e)))?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status()).into()));
    }

    let total_size = response.content_length().unwrap_or(0);

    let pb = ProgressBar::new(total_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg}\n{bar:40.cyan/blue} {percent}% ({bytes}/{total_bytes})")
            .map_err(|e| failed(Box::new(e)))?
            .progress_chars("█▓▒░ "),
    );
    pb.set_message(format!("Downloading {url}..."));

    let mut file = File::create(dest).await.map_err(write_failed)?;
    let mut stream = response.bytes_stream();
    let mut hasher = Sha256::new();
    let mut downloaded = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| failed(Box::new(e)))?;

        file.write_all(&chunk).await.map_err(write_failed)?;
        hasher.update(&chunk);

        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }

    file.flush().await.map_err(write_failed)?;
    pb.finish_and_clear();

    Ok(Downloaded {
        bytes: downloaded,
        sha256: format!("{:x}", hasher.finalize()),
    })
}

/// Blocking wrapper around [`download_file`] for synchronous callers.
pub fn download_blocking(url: &str, dest: &Path) -> Result<Downloaded> {
    let failed = |e: Box<dyn std::error::Error + Send + Sync>| Error::DownloadFailed {
        url: url.to_string(),
        source: e,
    };
    let runtime = tokio::runtime::Runtime::new().map_err(|e| failed(Box::new(e)))?;
    let client = http_client().map_err(|e| failed(Box::new(e)))?;

    runtime.block_on(download_file(&client, url, dest))
}

/// Compare a computed digest against the configured one.
pub fn verify_checksum(url: &str, expected: &str, actual: &str) -> Result<()> {
    if expected.eq_ignore_ascii_case(actual) {
        Ok(())
    } else {
        Err(Error::ChecksumMismatch {
            url: url.to_string(),
            expected: expected.to_lowercase(),
            actual: actual.to_string(),
        })
    }
}
