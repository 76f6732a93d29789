//! Pitch-class profiles.

#![allow(clippy::cast_possible_truncation)]

use crate::analysis::Spectrogram;
use crate::constants::analysis::{C0_HZ, CHROMA_MIN_HZ};

/// Number of pitch classes in an octave.
pub const PITCH_CLASSES: usize = 12;

/// Pitch class index (0 = C) of a frequency, or `None` below the chroma range.
pub fn pitch_class_of(freq_hz: f64) -> Option<usize> {
    if !freq_hz.is_finite() || freq_hz < CHROMA_MIN_HZ {
        return None;
    }
    let semitones = (12.0 * (freq_hz / C0_HZ).log2()).round() as i64;
    usize::try_from(semitones.rem_euclid(12)).ok()
}

/// Time-averaged chroma vector.
///
/// Each frame's power is folded into 12 pitch classes and scaled so its
/// largest class is 1. Silent frames contribute zeros.
pub fn mean_chroma(spectrogram: &Spectrogram<'_>) -> [f32; PITCH_CLASSES] {
    let mut mean = [0.0f32; PITCH_CLASSES];
    if spectrogram.is_empty() {
        return mean;
    }

    let classes: Vec<Option<usize>> = (0..spectrogram.bins())
        .map(|k| pitch_class_of(spectrogram.bin_frequency(k)))
        .collect();

    spectrogram.for_each_frame(|_, frame| {
        let mut chroma = [0.0f32; PITCH_CLASSES];
        for (&power, class) in frame.iter().zip(&classes) {
            if let Some(pc) = class {
                chroma[*pc] += power;
            }
        }
        let peak = chroma.iter().copied().fold(0.0f32, f32::max);
        if peak > f32::MIN_POSITIVE {
            for (acc, value) in mean.iter_mut().zip(chroma) {
                *acc += value / peak;
            }
        }
    });

    #[allow(clippy::cast_precision_loss)]
    let frames = spectrogram.frames() as f32;
    for value in &mut mean {
        *value /= frames;
    }
    mean
}
