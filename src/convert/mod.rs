//! Lossless to distributable format conversion.

mod encoder;
mod mp3;

pub use encoder::FfmpegEncoder;
pub(crate) use encoder::stderr_tail;
pub use mp3::{FrameHeader, MpegVersion, first_audio_frame, read_mp3_bitrate};

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Re-encodes a lossless stem into the distributable format.
pub trait Transcoder: Send + Sync {
    /// Encode `lossless` into `compressed`, returning the written path.
    fn to_compressed(&self, lossless: &Path, compressed: &Path) -> Result<PathBuf>;

    /// Name of this transcoder (for logging).
    fn name(&self) -> &'static str;
}

/// Convert `lossless` to a 64 kbit/s MP3 at `compressed` with the default encoder.
pub fn to_compressed(lossless: &Path, compressed: &Path) -> Result<PathBuf> {
    FfmpegEncoder::default().to_compressed(lossless, compressed)
}
