//! Short-time power spectrum.
//!
//! Frames are centred: the signal is zero-padded by half a window on both
//! sides, so frame `t` is centred on sample `t * hop`.
//!
//! Frames are computed on demand and never stored as a matrix. Extractors
//! fold them one at a time with [`Spectrogram::for_each_frame`].

#![allow(clippy::cast_precision_loss)]

use crate::constants::analysis::{HOP_LENGTH, N_FFT};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Power spectrogram view over a borrowed mono signal.
#[derive(Debug, Clone, Copy)]
pub struct Spectrogram<'a> {
    samples: &'a [f32],
    sample_rate: u32,
    n_fft: usize,
    hop: usize,
    frames: usize,
}

impl<'a> Spectrogram<'a> {
    /// Spectrogram with the default window (2048) and hop (512).
    pub fn new(samples: &'a [f32], sample_rate: u32) -> Self {
        Self::with_params(samples, sample_rate, N_FFT, HOP_LENGTH)
    }

    /// Spectrogram with an explicit window length and hop.
    pub fn with_params(samples: &'a [f32], sample_rate: u32, n_fft: usize, hop: usize) -> Self {
        let frames = if samples.is_empty() || hop == 0 || n_fft == 0 {
            0
        } else {
            1 + samples.len() / hop
        };
        Self {
            samples,
            sample_rate,
            n_fft,
            hop,
            frames,
        }
    }

    /// Number of frames.
    pub const fn frames(&self) -> usize {
        self.frames
    }

    /// Number of frequency bins per frame.
    pub const fn bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Whether there are no frames.
    pub const fn is_empty(&self) -> bool {
        self.frames == 0
    }

    /// Sample rate of the analysed signal.
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Frames per second.
    pub fn frame_rate(&self) -> f64 {
        f64::from(self.sample_rate) / self.hop as f64
    }

    /// Centre frequency of bin `k` in Hz.
    pub fn bin_frequency(&self, k: usize) -> f64 {
        k as f64 * f64::from(self.sample_rate) / self.n_fft as f64
    }

    /// Visit the power values of every frame in time order.
    ///
    /// The slice passed to `visit` is reused between frames.
    pub fn for_each_frame(&self, mut visit: impl FnMut(usize, &[f32])) {
        if self.is_empty() {
            return;
        }
        let mut stft = FrameTransform::new(self.n_fft);
        for index in 0..self.frames {
            visit(index, stft.power(self.samples, index * self.hop));
        }
    }
}

/// FFT plan and buffers for one window length.
struct FrameTransform {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    power: Vec<f32>,
}

impl FrameTransform {
    fn new(n_fft: usize) -> Self {
        let fft = FftPlanner::<f32>::new().plan_fft_forward(n_fft);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        Self {
            fft,
            window: hann_window(n_fft),
            buffer: vec![Complex::new(0.0, 0.0); n_fft],
            scratch,
            power: Vec::with_capacity(n_fft / 2 + 1),
        }
    }

    /// Power spectrum of the window starting `start` samples into the padded signal.
    fn power(&mut self, samples: &[f32], start: usize) -> &[f32] {
        let pad = self.window.len() / 2;
        for (i, (slot, &w)) in self.buffer.iter_mut().zip(&self.window).enumerate() {
            let sample = (start + i)
                .checked_sub(pad)
                .and_then(|idx| samples.get(idx))
                .copied()
                .unwrap_or(0.0);
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let bins = self.window.len() / 2 + 1;
        self.power.clear();
        self.power
            .extend(self.buffer[..bins].iter().map(Complex::norm_sqr));
        &self.power
    }
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / size as f32).cos()))
        .collect()
}
