//! Input audio file descriptors.

use crate::error::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Container format inferred from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// RIFF WAVE.
    Wav,
    /// MPEG-1/2 Layer III.
    Mp3,
    /// Free Lossless Audio Codec.
    Flac,
    /// Ogg container (Vorbis, Opus).
    Ogg,
    /// MP4/M4A container with AAC.
    M4a,
    /// Anything else; decoding is attempted by content probing.
    Unknown,
}

impl AudioFormat {
    /// Infer the format from a path's extension.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("wav" | "wave") => Self::Wav,
            Some("mp3") => Self::Mp3,
            Some("flac") => Self::Flac,
            Some("ogg" | "oga" | "opus") => Self::Ogg,
            Some("m4a" | "mp4" | "aac") => Self::M4a,
            _ => Self::Unknown,
        }
    }
}

/// An input recording on durable storage.
///
/// Read-only to the pipeline; derived artifacts are namespaced by
/// [`AudioAsset::base_name`].
#[derive(Debug, Clone, Serialize)]
pub struct AudioAsset {
    path: PathBuf,
    base_name: String,
    format: AudioFormat,
}

impl AudioAsset {
    /// Describe an existing audio file.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        let path = std::path::absolute(path).map_err(|_| Error::InputNotFound {
            path: path.to_path_buf(),
        })?;
        Ok(Self {
            base_name: base_name(&path),
            format: AudioFormat::from_path(&path),
            path,
        })
    }

    /// Absolute path to the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without its extension.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Format inferred from the extension.
    pub const fn format(&self) -> AudioFormat {
        self.format
    }
}

/// File name of `path` without its final extension.
fn base_name(path: &Path) -> String {
    path.file_stem().map_or_else(
        || "unknown".to_string(),
        |s| s.to_string_lossy().into_owned(),
    )
}
