//! Key selection from chroma.

use crate::analysis::chroma::{PITCH_CLASSES, mean_chroma};
use crate::analysis::{KeyDetector, Spectrogram};
use crate::error::Result;
use serde::{Serialize, Serializer};
use tracing::debug;

/// One of the 12 equal-tempered pitch classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PitchClass {
    /// C
    C,
    /// C sharp
    CSharp,
    /// D
    D,
    /// D sharp
    DSharp,
    /// E
    E,
    /// F
    F,
    /// F sharp
    FSharp,
    /// G
    G,
    /// G sharp
    GSharp,
    /// A
    A,
    /// A sharp
    ASharp,
    /// B
    B,
}

impl PitchClass {
    /// All pitch classes in chroma order, starting at C.
    pub const ALL: [Self; PITCH_CLASSES] = [
        Self::C,
        Self::CSharp,
        Self::D,
        Self::DSharp,
        Self::E,
        Self::F,
        Self::FSharp,
        Self::G,
        Self::GSharp,
        Self::A,
        Self::ASharp,
        Self::B,
    ];

    /// Pitch class at chroma index `index` (wraps modulo 12).
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % PITCH_CLASSES]
    }

    /// Chroma index (0 = C).
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Sharp-spelled label, e.g. `C#`.
    pub const fn label(self) -> &'static str {
        match self {
            Self::C => "C",
            Self::CSharp => "C#",
            Self::D => "D",
            Self::DSharp => "D#",
            Self::E => "E",
            Self::F => "F",
            Self::FSharp => "F#",
            Self::G => "G",
            Self::GSharp => "G#",
            Self::A => "A",
            Self::ASharp => "A#",
            Self::B => "B",
        }
    }
}

impl std::fmt::Display for PitchClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for PitchClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Index of the strongest chroma bin; ties resolve to the lowest index.
pub fn strongest_pitch_class(chroma: &[f32; PITCH_CLASSES]) -> PitchClass {
    let mut best = 0;
    for (i, &value) in chroma.iter().enumerate().skip(1) {
        if value > chroma[best] {
            best = i;
        }
    }
    PitchClass::from_index(best)
}

/// Picks the pitch class with the highest mean chroma energy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromaKeyDetector;

impl KeyDetector for ChromaKeyDetector {
    fn detect(&self, spectrogram: &Spectrogram<'_>) -> Result<PitchClass> {
        let chroma = mean_chroma(spectrogram);
        debug!("Mean chroma: {:?}", chroma);
        Ok(strongest_pitch_class(&chroma))
    }

    fn name(&self) -> &'static str {
        "chroma-argmax"
    }
}
