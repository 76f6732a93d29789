//! Swappable feature extractors.

use crate::analysis::{PitchClass, Spectrogram, TempoEstimate};
use crate::error::Result;

/// Tempo estimation backend.
pub trait TempoEstimator: Send + Sync {
    /// Estimate the tempo of a spectrogram.
    fn estimate(&self, spectrogram: &Spectrogram<'_>) -> Result<TempoEstimate>;

    /// Name of this estimator (for logging).
    fn name(&self) -> &'static str;
}

/// Key detection backend.
pub trait KeyDetector: Send + Sync {
    /// Detect the tonal centre of a spectrogram.
    fn detect(&self, spectrogram: &Spectrogram<'_>) -> Result<PitchClass>;

    /// Name of this detector (for logging).
    fn name(&self) -> &'static str;
}
