//! Audio decoding using symphonia.

use crate::error::{Error, Result};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Decoded audio data.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Audio samples as mono f32 in range [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Native sample rate in Hz.
    pub sample_rate: u32,
    /// Number of channels in the source before downmixing.
    pub channels: usize,
    /// Duration in seconds.
    pub duration_secs: f32,
}

/// Decode an audio file to mono f32 samples at its native sample rate.
///
/// Any container and codec enabled in symphonia is accepted.
pub fn decode_audio_file(path: &Path) -> Result<DecodedAudio> {
    let file = File::open(path).map_err(|e| Error::AudioOpen {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::AudioOpen {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::NoAudioTracks {
            path: path.to_path_buf(),
        })?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| Error::AudioDecode {
            path: path.to_path_buf(),
            source: "missing sample rate".into(),
        })?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| Error::AudioDecode {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let mut samples = Vec::new();
    let mut channels = track
        .codec_params
        .channels
        .map_or(1, symphonia::core::audio::Channels::count);
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut skipped_packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(Error::AudioDecode {
                    path: path.to_path_buf(),
                    source: Box::new(e),
                });
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // A corrupt frame is recoverable; drop it and keep going.
            Err(SymphoniaError::DecodeError(reason)) => {
                skipped_packets += 1;
                debug!("Skipping undecodable packet: {reason}");
                continue;
            }
            Err(e) => {
                return Err(Error::AudioDecode {
                    path: path.to_path_buf(),
                    source: Box::new(e),
                });
            }
        };

        let spec = *decoded.spec();
        channels = spec.channels.count().max(1);
        let needed = decoded.capacity() * channels;
        if sample_buf.as_ref().is_none_or(|b| b.capacity() < needed) {
            sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }
        if let Some(buf) = sample_buf.as_mut() {
            buf.copy_interleaved_ref(decoded);
            downmix_into(buf.samples(), channels, &mut samples);
        }
    }

    if skipped_packets > 0 {
        warn!(
            "Skipped {} undecodable packet(s) in {}",
            skipped_packets,
            path.display()
        );
    }

    #[allow(clippy::cast_precision_loss)]
    let duration_secs = samples.len() as f32 / sample_rate as f32;

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
        duration_secs,
    })
}

/// Average interleaved frames down to mono and append them to `output`.
pub fn downmix_into(interleaved: &[f32], channels: usize, output: &mut Vec<f32>) {
    if channels <= 1 {
        output.extend_from_slice(interleaved);
        return;
    }

    #[allow(clippy::cast_precision_loss)]
    let scale = 1.0 / channels as f32;
    output.extend(
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() * scale),
    );
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_stereo_averages_frames() {
        let mut out = Vec::new();
        downmix_into(&[1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 2, &mut out);
        assert_eq!(out, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_downmix_mono_passthrough() {
        let mut out = vec![0.25];
        downmix_into(&[0.5, -0.5], 1, &mut out);
        assert_eq!(out, vec![0.25, 0.5, -0.5]);
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let result = decode_audio_file(Path::new("/nonexistent/song.wav"));
        assert!(matches!(result, Err(Error::AudioOpen { .. })));
    }
}
