//! Tempo, key and chord analysis of a whole file.

use crate::analysis::{
    BeatTracker, ChromaKeyDetector, KeyDetector, PitchClass, Spectrogram, TempoEstimator,
};
use crate::audio::{DecodedAudio, decode_audio_file};
use crate::constants::CHORDS_PLACEHOLDER;
use crate::error::{Error, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Musical features of one input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// Tempo in BPM; 0 when none was detected.
    pub tempo: f64,
    /// Dominant pitch class.
    pub key: PitchClass,
    /// Chord description.
    pub chords: String,
}

/// Runs the feature extractors over decoded audio.
pub struct AudioAnalyzer {
    tempo: Box<dyn TempoEstimator>,
    key: Box<dyn KeyDetector>,
}

impl Default for AudioAnalyzer {
    fn default() -> Self {
        Self::new(BeatTracker::default(), ChromaKeyDetector)
    }
}

impl AudioAnalyzer {
    /// Analyzer over explicit extractors.
    pub fn new(
        tempo: impl TempoEstimator + 'static,
        key: impl KeyDetector + 'static,
    ) -> Self {
        Self {
            tempo: Box::new(tempo),
            key: Box::new(key),
        }
    }

    /// Decode `path` and extract tempo and key.
    pub fn analyze(&self, path: &Path) -> Result<AnalysisResult> {
        info!("Analyzing {}", path.display());
        let audio = decode_audio_file(path)?;
        self.analyze_decoded(path, &audio)
    }

    /// Extract features from already decoded mono audio read from `path`.
    pub fn analyze_decoded(&self, path: &Path, audio: &DecodedAudio) -> Result<AnalysisResult> {
        let fail = |reason: &str| Error::Analysis {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };
        if audio.samples.is_empty() {
            return Err(fail("empty waveform"));
        }
        if audio.sample_rate == 0 {
            return Err(fail("sample rate is zero"));
        }
        if audio.samples.iter().any(|s| !s.is_finite()) {
            return Err(fail("waveform contains non-finite samples"));
        }

        let spectrogram = Spectrogram::new(&audio.samples, audio.sample_rate);
        debug!(
            "Spectrogram: {} frames x {} bins at {:.2} frames/s",
            spectrogram.frames(),
            spectrogram.bins(),
            spectrogram.frame_rate()
        );

        let estimate = self.tempo.estimate(&spectrogram)?;
        debug!("{} estimate: {:?}", self.tempo.name(), estimate);
        let tempo = estimate.to_bpm();

        let key = self.key.detect(&spectrogram)?;
        debug!("{} picked {}", self.key.name(), key);

        info!("Analysis complete. Tempo: {:.2} BPM, Key: {}", tempo, key);
        Ok(AnalysisResult {
            tempo,
            key,
            chords: CHORDS_PLACEHOLDER.to_string(),
        })
    }
}

impl std::fmt::Debug for AudioAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioAnalyzer")
            .field("tempo", &self.tempo.name())
            .field("key", &self.key.name())
            .finish()
    }
}
