//! Error types for stemsplit.

use std::path::PathBuf;

/// Result type alias for stemsplit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Model provisioning (download, extraction, locking).
    Provisioning,
    /// Source separation backend.
    Separation,
    /// Lossless to compressed re-encoding.
    Conversion,
    /// Tempo and key analysis.
    Analysis,
    /// Configuration, CLI and generic I/O.
    Other,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Provisioning => write!(f, "provisioning"),
            Self::Separation => write!(f, "separation"),
            Self::Conversion => write!(f, "conversion"),
            Self::Analysis => write!(f, "analysis"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Top-level error type for stemsplit.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Data directory could not be determined.
    #[error("could not determine data directory for this platform")]
    DataDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// Input audio file does not exist.
    #[error("input audio file not found: {path}")]
    InputNotFound {
        /// Path to the missing input.
        path: PathBuf,
    },

    /// Model directory is empty and no remote source is configured.
    #[error(
        "separation model missing: '{dir}' is empty and no model URL is configured"
    )]
    ModelMissing {
        /// Model directory that was expected to hold the model.
        dir: PathBuf,
    },

    /// Download failed.
    #[error("failed to download from '{url}'")]
    DownloadFailed {
        /// URL that failed.
        url: String,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Downloaded archive does not match the configured checksum.
    #[error("checksum mismatch for '{url}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// URL the archive was fetched from.
        url: String,
        /// Configured SHA-256 digest.
        expected: String,
        /// Computed SHA-256 digest.
        actual: String,
    },

    /// Archive could not be recognized.
    #[error("unrecognized model archive format: {path}")]
    UnknownArchiveFormat {
        /// Path to the archive.
        path: PathBuf,
    },

    /// Failed to extract model archive.
    #[error("failed to extract model archive '{path}'")]
    ArchiveExtract {
        /// Path to the archive.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Archive contained no entries.
    #[error("model archive '{path}' contained no files")]
    ArchiveEmpty {
        /// Path to the archive.
        path: PathBuf,
    },

    /// Failed to create the model directory or its staging area.
    #[error("failed to create model directory '{path}'")]
    ModelDirCreate {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the downloaded archive to disk.
    #[error("failed to write model archive '{path}'")]
    ArchiveWrite {
        /// Path to the archive being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to move extracted model files into the model directory.
    #[error("failed to install extracted model into '{path}'")]
    ModelInstall {
        /// Model directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Lock file exists and is held by another process.
    #[error("model directory is locked by another process: {path}")]
    FileLocked {
        /// Path to the lock file.
        path: PathBuf,
    },

    /// Failed to create lock file.
    #[error("failed to create lock file '{path}'")]
    LockCreate {
        /// Path to the lock file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to remove lock file.
    #[error("failed to remove lock file '{path}'")]
    LockRemove {
        /// Path to the lock file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Separation backend failed.
    #[error("separation failed for '{input}': {reason}")]
    Separation {
        /// Input audio file.
        input: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Failed to create output directory.
    #[error("failed to create output directory '{path}'")]
    OutputDirCreateFailed {
        /// Path to the output directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Two inputs in one batch share a base name.
    #[error("stems for '{input}' would overwrite those of '{other}' in '{track_dir}'")]
    OutputCollision {
        /// Input that was skipped.
        input: PathBuf,
        /// Earlier input that owns the directory.
        other: PathBuf,
        /// Shared `O/B` directory.
        track_dir: PathBuf,
    },

    /// Re-encoding failed.
    #[error("failed to convert '{input}' to '{output}': {reason}")]
    Conversion {
        /// Lossless source file.
        input: PathBuf,
        /// Compressed target file.
        output: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// No valid MPEG audio frame header was found.
    #[error("no MPEG audio frame header found in '{path}'")]
    Mp3Header {
        /// Path to the MP3 file.
        path: PathBuf,
    },

    /// Failed to open audio file.
    #[error("failed to open audio file '{path}'")]
    AudioOpen {
        /// Path to the audio file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to decode audio.
    #[error("failed to decode audio from '{path}'")]
    AudioDecode {
        /// Path to the audio file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No audio tracks found.
    #[error("no audio tracks found in '{path}'")]
    NoAudioTracks {
        /// Path to the audio file.
        path: PathBuf,
    },

    /// Feature extraction failed.
    #[error("analysis failed for '{path}': {reason}")]
    Analysis {
        /// Path to the analyzed file.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Failed to serialize a report.
    #[error("failed to serialize report")]
    ReportSerialize {
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// No audio files were found among the inputs.
    #[error("no audio files found in the given inputs")]
    NoInputFiles,

    /// Some files in a batch failed.
    #[error("{failed} of {total} file(s) failed")]
    ProcessFailed {
        /// Files with at least one failed stage.
        failed: usize,
        /// Files processed.
        total: usize,
    },
}

impl Error {
    /// Pipeline stage this error belongs to.
    pub const fn stage(&self) -> Stage {
        match self {
            Self::ModelMissing { .. }
            | Self::DownloadFailed { .. }
            | Self::ChecksumMismatch { .. }
            | Self::UnknownArchiveFormat { .. }
            | Self::ArchiveExtract { .. }
            | Self::ArchiveEmpty { .. }
            | Self::ModelDirCreate { .. }
            | Self::ArchiveWrite { .. }
            | Self::ModelInstall { .. }
            | Self::FileLocked { .. }
            | Self::LockCreate { .. }
            | Self::LockRemove { .. }
            | Self::DataDirNotFound => Stage::Provisioning,
            Self::Separation { .. }
            | Self::InputNotFound { .. }
            | Self::OutputDirCreateFailed { .. }
            | Self::OutputCollision { .. } => Stage::Separation,
            Self::Conversion { .. } | Self::Mp3Header { .. } => Stage::Conversion,
            Self::AudioOpen { .. }
            | Self::AudioDecode { .. }
            | Self::NoAudioTracks { .. }
            | Self::Analysis { .. } => Stage::Analysis,
            Self::Io(_)
            | Self::ConfigDirNotFound
            | Self::ConfigRead { .. }
            | Self::ConfigParse { .. }
            | Self::ConfigValidation { .. }
            | Self::ConfigWrite { .. }
            | Self::ConfigSerialize { .. }
            | Self::ReportSerialize { .. }
            | Self::NoInputFiles
            | Self::ProcessFailed { .. } => Stage::Other,
        }
    }

    /// Message including the full `source()` chain, for display to users.
    pub fn report(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}
