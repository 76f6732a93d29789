//! MP3 encoding through an external `ffmpeg` process.

use crate::constants::conversion::{BITRATE_KBPS, DEFAULT_PROGRAM};
use crate::convert::{Transcoder, read_mp3_bitrate};
use crate::error::{Error, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Number of trailing stderr lines kept in error messages.
const STDERR_TAIL_LINES: usize = 5;

/// MP3 encoder driving `ffmpeg` with libmp3lame at a fixed 64 kbit/s.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    program: String,
}

impl FfmpegEncoder {
    /// Encoder running `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, lossless: &Path, compressed: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-hide_banner")
            .arg("-nostdin")
            .arg("-loglevel")
            .arg("error")
            .arg("-y")
            .arg("-i")
            .arg(lossless)
            .arg("-vn")
            .arg("-codec:a")
            .arg("libmp3lame")
            .arg("-b:a")
            .arg(format!("{BITRATE_KBPS}k"))
            .arg(compressed);
        cmd.stdout(Stdio::null()).stderr(Stdio::piped());
        cmd
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl Transcoder for FfmpegEncoder {
    fn to_compressed(&self, lossless: &Path, compressed: &Path) -> Result<PathBuf> {
        let fail = |reason: String| Error::Conversion {
            input: lossless.to_path_buf(),
            output: compressed.to_path_buf(),
            reason,
        };

        File::open(lossless).map_err(|e| fail(format!("cannot read input: {e}")))?;
        if let Some(parent) = compressed.parent()
            && !parent.as_os_str().is_empty()
            && !parent.is_dir()
        {
            return Err(fail(format!(
                "output directory does not exist: {}",
                parent.display()
            )));
        }

        info!(
            "Converting {} to MP3 at {} (bitrate {}k)",
            lossless.display(),
            compressed.display(),
            BITRATE_KBPS
        );

        let mut cmd = self.command(lossless, compressed);
        debug!("Running encoder: {:?}", cmd);

        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                fail(format!("encoder '{}' not found on PATH", self.program))
            } else {
                fail(format!("failed to spawn '{}': {e}", self.program))
            }
        })?;

        if !output.status.success() {
            return Err(fail(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                stderr_tail(&output.stderr)
            )));
        }

        let written = std::fs::metadata(compressed).map_or(0, |m| m.len());
        if written == 0 {
            return Err(fail("encoder produced no output".to_string()));
        }

        match read_mp3_bitrate(compressed) {
            Ok(kbps) => debug!("Wrote {} bytes at {} kbit/s", written, kbps),
            Err(e) => debug!("Could not read MP3 header: {e}"),
        }
        info!("MP3 saved at {}", compressed.display());

        Ok(compressed.to_path_buf())
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}

/// Last few non-empty stderr lines, joined for display.
pub(crate) fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    let tail = lines[start..].join(" | ");
    if tail.is_empty() {
        "no diagnostic output".to_string()
    } else {
        tail
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_command_arguments() {
        let encoder = FfmpegEncoder::default();
        let cmd = encoder.command(Path::new("in.wav"), Path::new("out.mp3"));
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(cmd.get_program(), "ffmpeg");
        assert!(args.windows(2).any(|w| w == ["-b:a", "64k"]));
        assert!(args.windows(2).any(|w| w == ["-codec:a", "libmp3lame"]));
        assert_eq!(args.last().map(String::as_str), Some("out.mp3"));
    }

    #[test]
    fn test_unreadable_input_is_conversion_error() {
        let temp_dir = TempDir::new().unwrap();
        let encoder = FfmpegEncoder::default();
        let result = encoder.to_compressed(
            &temp_dir.path().join("missing.wav"),
            &temp_dir.path().join("missing.mp3"),
        );
        assert!(matches!(result, Err(Error::Conversion { .. })));
    }

    #[test]
    fn test_missing_output_dir_is_conversion_error() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in.wav");
        std::fs::write(&input, b"RIFF").unwrap();

        let result = FfmpegEncoder::default()
            .to_compressed(&input, &temp_dir.path().join("no/such/dir/out.mp3"));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("output directory does not exist"));
    }

    #[test]
    fn test_missing_program_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in.wav");
        std::fs::write(&input, b"RIFF").unwrap();

        let encoder = FfmpegEncoder::new("stemsplit-no-such-encoder");
        let err = encoder
            .to_compressed(&input, &temp_dir.path().join("out.mp3"))
            .unwrap_err();
        assert!(err.to_string().contains("not found on PATH"));
    }

    #[test]
    fn test_stderr_tail_keeps_last_lines() {
        let stderr = b"a\nb\n\nc\nd\ne\nf\ng\n";
        assert_eq!(stderr_tail(stderr), "c | d | e | f | g");
        assert_eq!(stderr_tail(b""), "no diagnostic output");
    }
}
