//! On-disk layout of separated stems.
//!
//! For an input with base name `B` and output root `O` the separator
//! creates `O/B` and hands it to the backend, which writes its results into
//! its own `B` subdirectory. Every artifact therefore lives at
//! `O/B/B/<stem>.<ext>`. Downstream consumers locate stems by this path, so
//! the double nesting must not change.

use crate::audio::AudioAsset;
use crate::constants::conversion::{COMPRESSED_EXTENSION, LOSSLESS_EXTENSION};
use crate::separate::Stem;
use std::path::{Path, PathBuf};

/// Resolved output paths for one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StemLayout {
    base_name: String,
    track_dir: PathBuf,
    stem_dir: PathBuf,
}

impl StemLayout {
    /// Layout for `asset` under `output_root`.
    pub fn new(asset: &AudioAsset, output_root: &Path) -> Self {
        Self::from_base_name(asset.base_name(), output_root)
    }

    fn from_base_name(base_name: &str, output_root: &Path) -> Self {
        let base_name = base_name.to_string();
        let track_dir = output_root.join(&base_name);
        let stem_dir = track_dir.join(&base_name);
        Self {
            base_name,
            track_dir,
            stem_dir,
        }
    }

    /// Input file name without extension.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// `O/B`: the directory passed to the backend.
    pub fn track_dir(&self) -> &Path {
        &self.track_dir
    }

    /// `O/B/B`: the directory the backend writes stems into.
    pub fn stem_dir(&self) -> &Path {
        &self.stem_dir
    }

    /// Lossless intermediate for `stem`.
    pub fn lossless_path(&self, stem: Stem) -> PathBuf {
        self.stem_dir
            .join(format!("{}.{LOSSLESS_EXTENSION}", stem.as_str()))
    }

    /// Compressed output for `stem`.
    pub fn compressed_path(&self, stem: Stem) -> PathBuf {
        self.stem_dir
            .join(format!("{}.{COMPRESSED_EXTENSION}", stem.as_str()))
    }
}
