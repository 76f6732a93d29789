//! Stem identifiers and separation results.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::path::PathBuf;

/// A separated component of the mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stem {
    /// Lead and backing vocals.
    Vocals,
    /// Everything that is not vocals.
    Accompaniment,
}

impl Stem {
    /// Every stem the two-stem model produces, in output order.
    pub const ALL: [Self; 2] = [Self::Vocals, Self::Accompaniment];

    /// File stem used by the separation backend.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vocals => "vocals",
            Self::Accompaniment => "accompaniment",
        }
    }
}

impl std::fmt::Display for Stem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output files for one stem.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StemFiles {
    /// Lossless intermediate written by the separator.
    #[serde(rename = "wav")]
    pub lossless: PathBuf,
    /// Distributable compressed copy.
    #[serde(rename = "mp3")]
    pub compressed: PathBuf,
}

/// Result of one separation run.
///
/// A stem is present only if the backend actually produced its lossless
/// file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StemSet {
    /// Vocal stem, if produced.
    pub vocals: Option<StemFiles>,
    /// Accompaniment stem, if produced.
    pub accompaniment: Option<StemFiles>,
}

impl StemSet {
    /// Files for `stem`, if it was produced.
    pub const fn get(&self, stem: Stem) -> Option<&StemFiles> {
        match stem {
            Stem::Vocals => self.vocals.as_ref(),
            Stem::Accompaniment => self.accompaniment.as_ref(),
        }
    }

    /// Record the files for `stem`.
    pub fn insert(&mut self, stem: Stem, files: StemFiles) {
        let slot = match stem {
            Stem::Vocals => &mut self.vocals,
            Stem::Accompaniment => &mut self.accompaniment,
        };
        *slot = Some(files);
    }

    /// Produced stems in output order.
    pub fn iter(&self) -> impl Iterator<Item = (Stem, &StemFiles)> {
        Stem::ALL
            .into_iter()
            .filter_map(|stem| self.get(stem).map(|files| (stem, files)))
    }

    /// Number of produced stems.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether no stem was produced.
    pub fn is_empty(&self) -> bool {
        self.vocals.is_none() && self.accompaniment.is_none()
    }
}

impl Serialize for StemSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (stem, files) in self.iter() {
            map.serialize_entry(stem.as_str(), files)?;
        }
        map.end()
    }
}
