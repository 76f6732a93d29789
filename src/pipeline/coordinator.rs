//! Input discovery for batch processing.

use crate::audio::AudioFormat;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Output root for separated stems.
    pub output_root: PathBuf,
    /// Stop at the first failing file.
    pub fail_fast: bool,
    /// Show a progress bar over files.
    pub progress: bool,
}

/// Collect input files from paths (files and directories).
///
/// Explicit files are taken as given; directories are searched recursively
/// for files with a known audio extension.
pub fn collect_input_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            collect_audio_files_recursive(path, &mut files)?;
        } else {
            warn!("Skipping non-existent path: {}", path.display());
        }
    }

    Ok(files)
}

/// Recursively collect audio files from a directory.
fn collect_audio_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            collect_audio_files_recursive(&path, files)?;
        } else if is_audio_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

/// Check if a path has a recognized audio extension.
pub fn is_audio_file(path: &Path) -> bool {
    AudioFormat::from_path(path) != AudioFormat::Unknown
}
