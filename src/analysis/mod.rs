//! Tempo and key analysis.

mod analyzer;
pub mod chroma;
mod key;
mod spectrum;
mod tempo;
mod traits;

pub use analyzer::{AnalysisResult, AudioAnalyzer};
pub use key::{ChromaKeyDetector, PitchClass, strongest_pitch_class};
pub use spectrum::Spectrogram;
pub use tempo::{BeatTrack, BeatTracker, TempoEstimate, onset_envelope, track_beats};
pub use traits::{KeyDetector, TempoEstimator};

use crate::error::Result;
use std::path::Path;

/// Analyze `path` with the default beat tracker and chroma key detector.
pub fn analyze(path: &Path) -> Result<AnalysisResult> {
    AudioAnalyzer::default().analyze(path)
}
