//! Onset detection, tempo estimation and beat tracking.

#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use crate::analysis::{Spectrogram, TempoEstimator};
use crate::constants::analysis::{
    BEAT_TIGHTNESS, MAX_BPM, MIN_BPM, MIN_TEMPO_FRAMES, PRIOR_BPM, PRIOR_OCTAVES,
};
use crate::error::Result;
use tracing::debug;

/// Power floor before taking logarithms.
const AMIN: f32 = 1e-10;

/// Dynamic range kept below the loudest bin, in dB.
const TOP_DB: f32 = 80.0;

/// Raw tempo output: a single value or a per-segment sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum TempoEstimate {
    /// One global tempo in BPM.
    Scalar(f64),
    /// Tempo values in BPM; empty when no tempo was found.
    Sequence(Vec<f64>),
}

impl TempoEstimate {
    /// Collapse to a single non-negative BPM value.
    ///
    /// A sequence yields its first element (or 0 when empty). Negative and
    /// non-finite values become 0.
    pub fn to_bpm(&self) -> f64 {
        let raw = match self {
            Self::Scalar(bpm) => *bpm,
            Self::Sequence(values) => values.first().copied().unwrap_or(0.0),
        };
        if raw.is_finite() && raw > 0.0 { raw } else { 0.0 }
    }
}

/// Tempo plus the beat positions placed against it.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatTrack {
    /// Estimated tempo.
    pub tempo: TempoEstimate,
    /// Beat times in seconds.
    pub beats: Vec<f64>,
}

/// Autocorrelation tempo estimator with dynamic-programming beat tracking.
#[derive(Debug, Clone)]
pub struct BeatTracker {
    min_bpm: f64,
    max_bpm: f64,
    prior_bpm: f64,
    prior_octaves: f64,
    tightness: f64,
}

impl Default for BeatTracker {
    fn default() -> Self {
        Self {
            min_bpm: MIN_BPM,
            max_bpm: MAX_BPM,
            prior_bpm: PRIOR_BPM,
            prior_octaves: PRIOR_OCTAVES,
            tightness: BEAT_TIGHTNESS,
        }
    }
}

impl BeatTracker {
    /// Estimate the tempo of `spectrogram` and place beats.
    pub fn track(&self, spectrogram: &Spectrogram<'_>) -> BeatTrack {
        let envelope = onset_envelope(spectrogram);
        let frame_rate = spectrogram.frame_rate();

        let Some(bpm) = self.estimate_bpm(&envelope, frame_rate) else {
            debug!("No tempo found in {} frames", envelope.len());
            return BeatTrack {
                tempo: TempoEstimate::Sequence(Vec::new()),
                beats: Vec::new(),
            };
        };

        let period = 60.0 * frame_rate / bpm;
        let beats: Vec<f64> = track_beats(&envelope, period, self.tightness)
            .into_iter()
            .map(|frame| frame as f64 / frame_rate)
            .collect();
        debug!("Tempo {:.2} BPM, {} beats", bpm, beats.len());

        BeatTrack {
            tempo: TempoEstimate::Sequence(vec![bpm]),
            beats,
        }
    }

    /// Tempo in BPM from the onset envelope autocorrelation, weighted by a
    /// log-normal prior. `None` for silence or too few frames.
    fn estimate_bpm(&self, envelope: &[f32], frame_rate: f64) -> Option<f64> {
        if envelope.len() < MIN_TEMPO_FRAMES || frame_rate <= 0.0 {
            return None;
        }

        let min_lag = ((60.0 * frame_rate / self.max_bpm).ceil() as usize).max(1);
        let max_lag = ((60.0 * frame_rate / self.min_bpm).floor() as usize).min(envelope.len() - 1);
        if min_lag > max_lag {
            return None;
        }

        let ac = autocorrelate(envelope, max_lag + 1);
        let energy = ac[0];
        if energy <= f64::EPSILON {
            return None;
        }

        let score = |lag: usize| -> f64 {
            let bpm = 60.0 * frame_rate / lag as f64;
            let octaves = (bpm / self.prior_bpm).log2() / self.prior_octaves;
            (1e6 * (ac[lag] / energy).max(0.0)).ln_1p() - 0.5 * octaves * octaves
        };

        let best = (min_lag..=max_lag).max_by(|&a, &b| score(a).total_cmp(&score(b)))?;

        // Parabolic refinement between neighbouring lags.
        let mut lag = best as f64;
        if best > min_lag && best < max_lag {
            let (prev, here, next) = (score(best - 1), score(best), score(best + 1));
            let denom = prev - 2.0 * here + next;
            if denom.abs() > f64::EPSILON {
                lag += (0.5 * (prev - next) / denom).clamp(-0.5, 0.5);
            }
        }

        Some(60.0 * frame_rate / lag)
    }
}

impl TempoEstimator for BeatTracker {
    fn estimate(&self, spectrogram: &Spectrogram<'_>) -> Result<TempoEstimate> {
        Ok(self.track(spectrogram).tempo)
    }

    fn name(&self) -> &'static str {
        "beat-tracker"
    }
}

/// Onset strength per frame: mean half-wave rectified increase in log power.
///
/// Log power is clipped at [`TOP_DB`] below the loudest bin of the whole
/// signal, so the frames are visited twice: once for the peak, once for the
/// rises. Only the previous frame is kept between steps.
pub fn onset_envelope(spectrogram: &Spectrogram<'_>) -> Vec<f32> {
    let frames = spectrogram.frames();
    if frames == 0 {
        return Vec::new();
    }

    let mut peak = 0.0f32;
    spectrogram.for_each_frame(|_, power| {
        peak = power.iter().copied().fold(peak, f32::max);
    });
    let floor_db = to_db(peak) - TOP_DB;
    let db = |p: f32| to_db(p).max(floor_db);

    let bins = spectrogram.bins() as f32;
    let mut envelope = Vec::with_capacity(frames);
    let mut previous: Vec<f32> = Vec::with_capacity(spectrogram.bins());
    spectrogram.for_each_frame(|index, power| {
        if index == 0 {
            envelope.push(0.0);
        } else {
            let rise: f32 = power
                .iter()
                .zip(&previous)
                .map(|(&now, &before)| (db(now) - before).max(0.0))
                .sum();
            envelope.push(rise / bins);
        }
        previous.clear();
        previous.extend(power.iter().copied().map(db));
    });
    envelope
}

fn to_db(power: f32) -> f32 {
    10.0 * power.max(AMIN).log10()
}

fn autocorrelate(signal: &[f32], max_lag: usize) -> Vec<f64> {
    (0..max_lag)
        .map(|lag| {
            signal
                .iter()
                .zip(&signal[lag.min(signal.len())..])
                .map(|(&a, &b)| f64::from(a) * f64::from(b))
                .sum()
        })
        .collect()
}

/// Place beats on `envelope` at roughly `period` frames apart.
///
/// Each frame's score is its smoothed onset strength plus the best
/// predecessor score, penalised by how far the gap strays from `period`
/// (log-squared, scaled by `tightness`). Beats are read back from the last
/// strong peak.
pub fn track_beats(envelope: &[f32], period: f64, tightness: f64) -> Vec<usize> {
    let n = envelope.len();
    if n == 0 || !period.is_finite() || period < 1.0 {
        return Vec::new();
    }

    let mean = envelope.iter().map(|&v| f64::from(v)).sum::<f64>() / n as f64;
    let var = envelope
        .iter()
        .map(|&v| (f64::from(v) - mean).powi(2))
        .sum::<f64>()
        / (n.max(2) - 1) as f64;
    let std = var.sqrt();
    if std <= f64::EPSILON {
        return Vec::new();
    }

    // Gaussian smoothing matched to the beat period.
    let half = period.round() as isize;
    let kernel: Vec<f64> = (-half..=half)
        .map(|k| (-0.5 * (k as f64 * 32.0 / period).powi(2)).exp())
        .collect();
    let local: Vec<f64> = (0..n)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .filter_map(|(j, w)| {
                    let idx = i as isize + j as isize - half;
                    usize::try_from(idx)
                        .ok()
                        .and_then(|idx| envelope.get(idx))
                        .map(|&v| w * f64::from(v) / std)
                })
                .sum()
        })
        .collect();

    let min_gap = ((period / 2.0).round() as usize).max(1);
    let max_gap = ((period * 2.0).round() as usize).max(min_gap);

    let mut cumulative = vec![0.0f64; n];
    let mut backlink: Vec<Option<usize>> = vec![None; n];
    for i in 0..n {
        let mut best: Option<(usize, f64)> = None;
        if i >= min_gap {
            for prev in i.saturating_sub(max_gap)..=i - min_gap {
                let gap = (i - prev) as f64;
                let candidate = cumulative[prev] - tightness * (gap / period).ln().powi(2);
                if best.is_none_or(|(_, score)| candidate > score) {
                    best = Some((prev, candidate));
                }
            }
        }
        cumulative[i] = local[i] + best.map_or(0.0, |(_, score)| score.max(0.0));
        backlink[i] = best.filter(|&(_, score)| score > 0.0).map(|(prev, _)| prev);
    }

    let Some(mut beat) = last_beat(&cumulative) else {
        return Vec::new();
    };
    let mut beats = vec![beat];
    while let Some(prev) = backlink[beat] {
        beats.push(prev);
        beat = prev;
    }
    beats.reverse();
    trim_weak_beats(&beats, &local)
}

/// Last local maximum of the cumulative score above half the median peak.
fn last_beat(cumulative: &[f64]) -> Option<usize> {
    let n = cumulative.len();
    let peaks: Vec<usize> = (0..n)
        .filter(|&i| {
            let left = i == 0 || cumulative[i] > cumulative[i - 1];
            let right = i + 1 == n || cumulative[i] >= cumulative[i + 1];
            left && right
        })
        .collect();
    if peaks.is_empty() {
        return None;
    }

    let mut values: Vec<f64> = peaks.iter().map(|&i| cumulative[i]).collect();
    values.sort_by(f64::total_cmp);
    let median = values[values.len() / 2];
    peaks
        .iter()
        .rev()
        .copied()
        .find(|&i| cumulative[i] >= 0.5 * median)
}

/// Drop leading and trailing beats on frames with little onset energy.
fn trim_weak_beats(beats: &[usize], local: &[f64]) -> Vec<usize> {
    if beats.is_empty() {
        return Vec::new();
    }
    let rms = (beats.iter().map(|&b| local[b].powi(2)).sum::<f64>() / beats.len() as f64).sqrt();
    let threshold = 0.5 * rms;
    let strong = |&&b: &&usize| local[b] >= threshold;

    let Some(first) = beats.iter().position(|b| strong(&b)) else {
        return Vec::new();
    };
    let last = beats.iter().rposition(|b| strong(&b)).unwrap_or(first);
    beats[first..=last].to_vec()
}
