//! Audio input handling.

mod asset;
mod decode;

pub use asset::{AudioAsset, AudioFormat};
pub use decode::{DecodedAudio, decode_audio_file, downmix_into};
