//! MPEG audio frame header inspection.
//!
//! Only enough of the format is decoded to report the bitrate of the first
//! audio frame, skipping an ID3v2 tag and a Xing/Info metadata frame.

use crate::error::{Error, Result};
use std::path::Path;

const ID3V2_HEADER_LEN: usize = 10;
const FRAME_HEADER_LEN: usize = 4;

const SAMPLE_RATES: [[u32; 3]; 3] = [
    [44_100, 48_000, 32_000], // MPEG-1
    [22_050, 24_000, 16_000], // MPEG-2
    [11_025, 12_000, 8_000],  // MPEG-2.5
];

const BITRATES_V1_L1: [u32; 15] = [
    0, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448,
];
const BITRATES_V1_L2: [u32; 15] = [
    0, 32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384,
];
const BITRATES_V1_L3: [u32; 15] = [
    0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320,
];
const BITRATES_V2_L1: [u32; 15] = [
    0, 32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256,
];
const BITRATES_V2_L23: [u32; 15] = [
    0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160,
];

/// MPEG audio version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    /// MPEG-1.
    V1,
    /// MPEG-2 (LSF).
    V2,
    /// MPEG-2.5.
    V25,
}

/// Decoded MPEG audio frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// MPEG version.
    pub version: MpegVersion,
    /// Layer (1, 2 or 3).
    pub layer: u8,
    /// Bitrate in kbit/s.
    pub bitrate_kbps: u32,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Single channel stream.
    pub mono: bool,
    /// Frame length in bytes, header included.
    pub frame_len: usize,
}

impl FrameHeader {
    /// Parse a 4-byte frame header. Returns `None` for invalid or free-format headers.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let &[b0, b1, b2, b3] = bytes.get(..FRAME_HEADER_LEN)? else {
            return None;
        };
        if b0 != 0xFF || b1 & 0xE0 != 0xE0 {
            return None;
        }

        let version = match (b1 >> 3) & 0b11 {
            0b00 => MpegVersion::V25,
            0b10 => MpegVersion::V2,
            0b11 => MpegVersion::V1,
            _ => return None,
        };
        let layer = match (b1 >> 1) & 0b11 {
            0b01 => 3,
            0b10 => 2,
            0b11 => 1,
            _ => return None,
        };

        let bitrate_index = usize::from(b2 >> 4);
        let rate_index = usize::from((b2 >> 2) & 0b11);
        if bitrate_index == 0 || bitrate_index == 15 || rate_index == 3 {
            return None;
        }

        let table = match (version, layer) {
            (MpegVersion::V1, 1) => &BITRATES_V1_L1,
            (MpegVersion::V1, 2) => &BITRATES_V1_L2,
            (MpegVersion::V1, _) => &BITRATES_V1_L3,
            (_, 1) => &BITRATES_V2_L1,
            _ => &BITRATES_V2_L23,
        };
        let bitrate_kbps = table[bitrate_index];
        let sample_rate = SAMPLE_RATES[match version {
            MpegVersion::V1 => 0,
            MpegVersion::V2 => 1,
            MpegVersion::V25 => 2,
        }][rate_index];
        let padding = usize::from((b2 >> 1) & 1);
        let mono = b3 >> 6 == 0b11;

        let bits = bitrate_kbps as usize * 1000;
        let rate = sample_rate as usize;
        let frame_len = match (layer, version) {
            (1, _) => (12 * bits / rate + padding) * 4,
            (3, MpegVersion::V2 | MpegVersion::V25) => 72 * bits / rate + padding,
            _ => 144 * bits / rate + padding,
        };

        Some(Self {
            version,
            layer,
            bitrate_kbps,
            sample_rate,
            mono,
            frame_len,
        })
    }

    /// Offset of a Xing/Info tag inside a Layer III frame.
    fn side_info_len(&self) -> usize {
        match (self.version, self.mono) {
            (MpegVersion::V1, true) | (MpegVersion::V2 | MpegVersion::V25, false) => 17,
            (MpegVersion::V1, false) => 32,
            (MpegVersion::V2 | MpegVersion::V25, true) => 9,
        }
    }
}

/// Length of a leading ID3v2 tag, or zero.
fn id3v2_len(data: &[u8]) -> usize {
    if data.len() < ID3V2_HEADER_LEN || &data[..3] != b"ID3" {
        return 0;
    }
    let size = data[6..10]
        .iter()
        .fold(0usize, |acc, b| (acc << 7) | usize::from(b & 0x7F));
    let footer = if data[5] & 0x10 != 0 { ID3V2_HEADER_LEN } else { 0 };
    ID3V2_HEADER_LEN + size + footer
}

fn is_info_frame(data: &[u8], offset: usize, header: &FrameHeader) -> bool {
    if header.layer != 3 {
        return false;
    }
    let tag = offset + FRAME_HEADER_LEN + header.side_info_len();
    matches!(data.get(tag..tag + 4), Some(b"Xing" | b"Info"))
}

/// Find the first audio frame header in an MPEG audio byte stream.
pub fn first_audio_frame(data: &[u8]) -> Option<FrameHeader> {
    let mut offset = id3v2_len(data);
    while offset + FRAME_HEADER_LEN <= data.len() {
        match FrameHeader::parse(&data[offset..]) {
            Some(header) if is_info_frame(data, offset, &header) => {
                offset += header.frame_len.max(1);
            }
            Some(header) => return Some(header),
            None => offset += 1,
        }
    }
    None
}

/// Read the bitrate in kbit/s of the first audio frame of an MP3 file.
pub fn read_mp3_bitrate(path: &Path) -> Result<u32> {
    let data = std::fs::read(path)?;
    first_audio_frame(&data)
        .map(|h| h.bitrate_kbps)
        .ok_or_else(|| Error::Mp3Header {
            path: path.to_path_buf(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // MPEG-1 Layer III, 64 kbit/s, 44.1 kHz, joint stereo.
    const V1_L3_64K: [u8; 4] = [0xFF, 0xFB, 0x50, 0x44];
    // MPEG-2 Layer III, 64 kbit/s, 22.05 kHz, mono.
    const V2_L3_64K_MONO: [u8; 4] = [0xFF, 0xF3, 0x80, 0xC4];

    fn frame(header: [u8; 4]) -> Vec<u8> {
        let parsed = FrameHeader::parse(&header).unwrap();
        let mut bytes = header.to_vec();
        bytes.resize(parsed.frame_len, 0);
        bytes
    }

    #[test]
    fn test_parse_mpeg1_layer3() {
        let header = FrameHeader::parse(&V1_L3_64K).unwrap();
        assert_eq!(header.version, MpegVersion::V1);
        assert_eq!(header.layer, 3);
        assert_eq!(header.bitrate_kbps, 64);
        assert_eq!(header.sample_rate, 44_100);
        assert_eq!(header.frame_len, 208);
        assert!(!header.mono);
    }

    #[test]
    fn test_parse_mpeg2_layer3_mono() {
        let header = FrameHeader::parse(&V2_L3_64K_MONO).unwrap();
        assert_eq!(header.version, MpegVersion::V2);
        assert_eq!(header.bitrate_kbps, 64);
        assert_eq!(header.sample_rate, 22_050);
        assert!(header.mono);
    }

    #[test]
    fn test_rejects_bad_sync_and_free_format() {
        assert!(FrameHeader::parse(&[0xFF, 0x00, 0x50, 0x44]).is_none());
        assert!(FrameHeader::parse(&[0xFF, 0xFB, 0x00, 0x44]).is_none());
        assert!(FrameHeader::parse(&[0xFF, 0xFB]).is_none());
    }

    #[test]
    fn test_skips_id3_and_info_frame() {
        let mut data = b"ID3\x04\x00\x00\x00\x00\x00\x05hello".to_vec();

        // Info frame advertising 128 kbit/s.
        let mut info = frame([0xFF, 0xFB, 0x90, 0x44]);
        info[4 + 32..4 + 36].copy_from_slice(b"Info");
        data.extend(info);
        data.extend(frame(V1_L3_64K));

        let header = first_audio_frame(&data).unwrap();
        assert_eq!(header.bitrate_kbps, 64);
    }

    #[test]
    fn test_no_frame_found() {
        assert!(first_audio_frame(b"RIFF....WAVEfmt ").is_none());
    }
}
