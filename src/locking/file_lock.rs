//! Lock files guarding first-time model provisioning.

use crate::constants::LOCK_FILE_EXTENSION;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Lock file content for debugging.
#[derive(Debug, Serialize, Deserialize)]
pub struct LockInfo {
    /// Process ID that holds the lock.
    pub pid: u32,
    /// Hostname of the machine.
    pub hostname: String,
    /// When the lock was acquired.
    pub started: DateTime<Utc>,
    /// Directory the lock protects.
    pub target: PathBuf,
}

/// RAII guard for a lock file placed next to the directory it protects.
#[derive(Debug)]
pub struct FileLock {
    lock_path: PathBuf,
}

impl FileLock {
    /// Attempt to acquire the lock for `target` without waiting.
    ///
    /// The lock file is a sibling of `target`, never inside it, so an
    /// empty directory stays empty while it is locked.
    pub fn try_acquire(target: &Path) -> Result<Self> {
        let lock_path = Self::lock_path_for(target);

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path);

        match file {
            Ok(mut f) => {
                let info = LockInfo {
                    pid: std::process::id(),
                    hostname: hostname::get().map_or_else(
                        |_| "unknown".to_string(),
                        |h| h.to_string_lossy().into_owned(),
                    ),
                    started: Utc::now(),
                    target: target.to_path_buf(),
                };

                let json = serde_json::to_string_pretty(&info).unwrap_or_else(|_| "{}".to_string());
                let _ = f.write_all(json.as_bytes());

                register_lock(&lock_path);
                debug!("Acquired lock {}", lock_path.display());

                Ok(Self { lock_path })
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(Error::FileLocked { path: lock_path })
            }
            Err(e) => Err(Error::LockCreate {
                path: lock_path,
                source: e,
            }),
        }
    }

    /// Acquire the lock for `target`, waiting while another holder has it.
    ///
    /// A lock older than `stale_after` is treated as abandoned and removed.
    pub fn acquire(target: &Path, poll: Duration, stale_after: Duration) -> Result<Self> {
        let mut announced = false;
        loop {
            match Self::try_acquire(target) {
                Err(Error::FileLocked { path }) => {
                    if Self::is_stale(target, stale_after) {
                        warn!("Removing stale lock {}", path.display());
                        // Another contender may have removed it first.
                        let _ = Self::remove_stale(target);
                        continue;
                    }
                    if !announced {
                        debug!("Waiting for lock {}", path.display());
                        announced = true;
                    }
                    std::thread::sleep(poll);
                }
                other => return other,
            }
        }
    }

    /// Get the lock file path for a protected directory.
    pub fn lock_path_for(target: &Path) -> PathBuf {
        let name = target
            .file_name()
            .map_or_else(|| "model".into(), |n| n.to_string_lossy());
        let parent = target.parent().unwrap_or_else(|| Path::new("."));
        parent.join(format!("{name}{LOCK_FILE_EXTENSION}"))
    }

    /// Check if a lock file exists.
    pub fn is_locked(target: &Path) -> bool {
        Self::lock_path_for(target).exists()
    }

    /// Check if a lock is stale (older than `max_age`).
    pub fn is_stale(target: &Path, max_age: Duration) -> bool {
        let lock_path = Self::lock_path_for(target);

        if let Ok(metadata) = fs::metadata(&lock_path)
            && let Ok(modified) = metadata.modified()
        {
            return modified.elapsed().unwrap_or_default() > max_age;
        }
        false
    }

    /// Remove a stale lock.
    pub fn remove_stale(target: &Path) -> Result<()> {
        let lock_path = Self::lock_path_for(target);
        fs::remove_file(&lock_path).map_err(|e| Error::LockRemove {
            path: lock_path,
            source: e,
        })
    }

    /// Path of the lock file held by this guard.
    pub fn path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
        unregister_lock(&self.lock_path);
    }
}

/// Global registry of active lock paths for cleanup on signal.
static ACTIVE_LOCKS: std::sync::LazyLock<std::sync::Mutex<Vec<PathBuf>>> =
    std::sync::LazyLock::new(|| std::sync::Mutex::new(Vec::new()));

/// Register a lock path for cleanup on signal.
pub fn register_lock(path: &Path) {
    if let Ok(mut locks) = ACTIVE_LOCKS.lock() {
        locks.push(path.to_path_buf());
    }
}

/// Unregister a lock path after normal cleanup.
pub fn unregister_lock(path: &Path) {
    if let Ok(mut locks) = ACTIVE_LOCKS.lock() {
        locks.retain(|p| p != path);
    }
}

/// Clean up all registered locks. Called on signal.
pub fn cleanup_all_locks() {
    if let Ok(locks) = ACTIVE_LOCKS.lock() {
        for lock_path in locks.iter() {
            let _ = fs::remove_file(lock_path);
        }
    }
}
