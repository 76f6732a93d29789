//! Separation model provisioning.
//!
//! The model directory is a process-wide cache: once it holds any entry it
//! is considered provisioned and never fetched again. First-time
//! provisioning is serialized by a process mutex and a sibling lock file.

mod archive;
mod download;

pub use archive::{ArchiveFormat, extract_archive};
pub use download::{Downloaded, download_blocking, download_file, http_client, verify_checksum};

use crate::config::{ModelConfig, default_model_dir};
use crate::constants::LOCK_POLL_INTERVAL_MS;
use crate::constants::STALE_LOCK_AGE_SECS;
use crate::constants::model::{EXTRACT_DIR, STAGING_SUFFIX, TEMP_ARCHIVE};
use crate::error::{Error, Result};
use crate::locking::FileLock;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info};

/// Serializes provisioning between threads of this process.
static PROVISION_GUARD: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// A separation model directory and where to fetch it from.
#[derive(Debug, Clone)]
pub struct SeparationModel {
    dir: PathBuf,
    url: Option<String>,
    sha256: Option<String>,
}

impl SeparationModel {
    /// Model stored at `dir` with no remote source.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            url: None,
            sha256: None,
        }
    }

    /// Set the remote archive fetched when the directory is empty.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Require the downloaded archive to match this SHA-256 digest.
    #[must_use]
    pub fn with_sha256(mut self, digest: impl Into<String>) -> Self {
        self.sha256 = Some(digest.into());
        self
    }

    /// Build from configuration, falling back to the platform data directory.
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let dir = match &config.dir {
            Some(dir) => dir.clone(),
            None => default_model_dir()?,
        };
        Ok(Self {
            dir,
            url: config.remote_url().map(str::to_string),
            sha256: config.sha256.clone(),
        })
    }

    /// Local model directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Remote archive URL, if configured.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Whether the directory already holds model files.
    pub fn is_provisioned(&self) -> bool {
        is_provisioned(&self.dir)
    }

    /// Make sure the model is present locally, fetching it on first use.
    ///
    /// Contents are only trusted without waiting when no provisioner holds
    /// the lock; a fetch in progress is waited for.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::ModelDirCreate {
            path: self.dir.clone(),
            source: e,
        })?;

        if self.is_provisioned() {
            if !FileLock::is_locked(&self.dir) {
                debug!("Model already provisioned at {}", self.dir.display());
                return Ok(());
            }
            debug!("Waiting for in-flight provisioning of {}", self.dir.display());
        } else if self.url.is_none() {
            // Checked before locking so a misconfigured call writes nothing.
            return Err(self.missing());
        }

        let _guard = PROVISION_GUARD
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let _lock = FileLock::acquire(
            &self.dir,
            Duration::from_millis(LOCK_POLL_INTERVAL_MS),
            Duration::from_secs(STALE_LOCK_AGE_SECS),
        )?;

        if self.is_provisioned() {
            info!("Model provisioned concurrently at {}", self.dir.display());
            return Ok(());
        }
        let Some(url) = self.url.as_deref() else {
            return Err(self.missing());
        };

        info!("Fetching separation model from {url}");
        self.fetch(url).inspect_err(|e| {
            error!("Model provisioning failed: {}", e.report());
        })
    }

    fn missing(&self) -> Error {
        let err = Error::ModelMissing {
            dir: self.dir.clone(),
        };
        error!("{err}");
        err
    }

    /// Download and unpack into the staging area, then move into place.
    fn fetch(&self, url: &str) -> Result<()> {
        let staging = staging_dir_for(&self.dir);
        if staging.exists() {
            debug!("Removing leftover staging area {}", staging.display());
            if let Err(e) = fs::remove_dir_all(&staging) {
                debug!("Could not remove {}: {e}", staging.display());
            }
        }
        fs::create_dir_all(&staging).map_err(|e| Error::ModelDirCreate {
            path: staging.clone(),
            source: e,
        })?;

        let outcome = self.download_and_install(url, &staging);
        if let Err(e) = fs::remove_dir_all(&staging) {
            debug!("Could not remove {}: {e}", staging.display());
        }
        let entries = outcome?;

        info!(
            "Model ready at {} ({} entries extracted)",
            self.dir.display(),
            entries
        );
        Ok(())
    }

    fn download_and_install(&self, url: &str, staging: &Path) -> Result<usize> {
        let archive = staging.join(TEMP_ARCHIVE);
        let downloaded = download_blocking(url, &archive)?;
        debug!(
            "Downloaded {} bytes (sha256 {})",
            downloaded.bytes, downloaded.sha256
        );

        if let Some(expected) = &self.sha256 {
            verify_checksum(url, expected, &downloaded.sha256)?;
        }

        let extracted = staging.join(EXTRACT_DIR);
        fs::create_dir(&extracted).map_err(|e| Error::ModelDirCreate {
            path: extracted.clone(),
            source: e,
        })?;
        let entries = extract_archive(&archive, &extracted)?;
        if !is_provisioned(&extracted) {
            return Err(Error::ArchiveEmpty { path: archive });
        }

        install(&extracted, &self.dir)?;
        Ok(entries)
    }
}

/// Move every top-level entry of `extracted` into the empty `dir`.
fn install(extracted: &Path, dir: &Path) -> Result<()> {
    let install_err = |e: std::io::Error| Error::ModelInstall {
        path: dir.to_path_buf(),
        source: e,
    };
    for entry in fs::read_dir(extracted).map_err(install_err)? {
        let entry = entry.map_err(install_err)?;
        fs::rename(entry.path(), dir.join(entry.file_name())).map_err(install_err)?;
    }
    Ok(())
}

/// Sibling directory a model for `dir` is fetched into before installation.
pub fn staging_dir_for(dir: &Path) -> PathBuf {
    let name = dir
        .file_name()
        .map_or_else(|| "model".into(), |n| n.to_string_lossy());
    let parent = dir.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!("{name}{STAGING_SUFFIX}"))
}

/// Ensure the model at `model_dir` exists, downloading `model_url` if it is empty.
pub fn ensure_model(model_dir: &Path, model_url: Option<&str>) -> Result<()> {
    let mut model = SeparationModel::new(model_dir);
    if let Some(url) = model_url {
        model = model.with_url(url);
    }
    model.ensure()
}

/// Whether `dir` contains at least one entry other than an in-flight download.
pub fn is_provisioned(dir: &Path) -> bool {
    fs::read_dir(dir).is_ok_and(|mut entries| {
        entries.any(|entry| entry.is_ok_and(|e| e.file_name() != TEMP_ARCHIVE))
    })
}
