//! Platform-specific configuration and data paths.

use crate::constants::{APP_NAME, model};
use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

/// Get the configuration directory for the current platform.
///
/// - Linux: `~/.config/stemsplit/`
/// - macOS: `~/Library/Application Support/stemsplit/`
/// - Windows: `%APPDATA%\stemsplit\config\`
pub fn config_dir() -> Result<PathBuf> {
    project_dirs()
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the config file.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Default separation model directory, `<data>/stemsplit/models/2stems`.
///
/// The backend resolves models by name under a shared root, so the
/// directory name must match the model name.
pub fn default_model_dir() -> Result<PathBuf> {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("models").join(model::DEFAULT_NAME))
        .ok_or(Error::DataDirNotFound)
}
