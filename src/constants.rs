//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "stemsplit";

/// Lock file extension, appended to the model directory name.
pub const LOCK_FILE_EXTENSION: &str = ".stemsplit.lock";

/// Age after which a provisioning lock is considered abandoned.
pub const STALE_LOCK_AGE_SECS: u64 = 30 * 60;

/// Interval between attempts to take a held provisioning lock.
pub const LOCK_POLL_INTERVAL_MS: u64 = 250;

/// Default output root for separated stems.
pub const DEFAULT_STEMS_DIR: &str = "stems";

/// Placeholder returned in place of chord recognition.
pub const CHORDS_PLACEHOLDER: &str = "Chord extraction not implemented";

/// Model and separation backend defaults.
pub mod model {
    /// Directory name of the two-stem model under the models directory.
    pub const DEFAULT_NAME: &str = "2stems";

    /// Upstream archive for the pretrained two-stem model.
    pub const DEFAULT_URL: &str =
        "https://github.com/deezer/spleeter/releases/download/v1.4.0/2stems.tar.gz";

    /// Separation backend executable.
    pub const DEFAULT_PROGRAM: &str = "spleeter";

    /// Model descriptor passed to the backend.
    pub const DEFAULT_DESCRIPTOR: &str = "spleeter:2stems";

    /// Environment variable the backend reads its model root from.
    pub const MODEL_PATH_ENV: &str = "MODEL_PATH";

    /// Marker the backend expects in a provisioned model directory.
    pub const MODEL_MARKER_FILE: &str = ".probe";

    /// Temporary archive name used while downloading.
    pub const TEMP_ARCHIVE: &str = ".model-download.tmp";

    /// Suffix of the sibling directory a model is fetched and unpacked in.
    pub const STAGING_SUFFIX: &str = ".stemsplit.partial";

    /// Subdirectory of the staging area receiving the archive contents.
    pub const EXTRACT_DIR: &str = "extracted";

    /// HTTP connect timeout in seconds.
    pub const CONNECT_TIMEOUT_SECS: u64 = 30;

    /// HTTP overall timeout in seconds.
    pub const DOWNLOAD_TIMEOUT_SECS: u64 = 600;
}

/// Compressed output settings.
pub mod conversion {
    /// Encoder executable.
    pub const DEFAULT_PROGRAM: &str = "ffmpeg";

    /// Fixed bitrate of distributable stems in kbit/s.
    pub const BITRATE_KBPS: u32 = 64;

    /// Lossless intermediate extension.
    pub const LOSSLESS_EXTENSION: &str = "wav";

    /// Compressed output extension.
    pub const COMPRESSED_EXTENSION: &str = "mp3";
}

/// Spectral analysis parameters.
pub mod analysis {
    /// FFT window length in samples.
    pub const N_FFT: usize = 2048;

    /// Hop between analysis frames in samples.
    pub const HOP_LENGTH: usize = 512;

    /// Lowest tempo considered, in BPM.
    pub const MIN_BPM: f64 = 30.0;

    /// Highest tempo considered, in BPM.
    pub const MAX_BPM: f64 = 300.0;

    /// Centre of the log-normal tempo prior, in BPM.
    pub const PRIOR_BPM: f64 = 120.0;

    /// Width of the tempo prior, in octaves.
    pub const PRIOR_OCTAVES: f64 = 1.0;

    /// Beat tracker tightness; higher values keep beats closer to the tempo period.
    pub const BEAT_TIGHTNESS: f64 = 100.0;

    /// Lowest frequency folded into chroma, in Hz (A0).
    pub const CHROMA_MIN_HZ: f64 = 27.5;

    /// Reference frequency of pitch class C (C0), in Hz.
    pub const C0_HZ: f64 = 16.351_597_831_287_414;

    /// Minimum number of frames needed to estimate tempo.
    pub const MIN_TEMPO_FRAMES: usize = 8;
}
