//! Separation backends.

use crate::constants::model::{DEFAULT_DESCRIPTOR, DEFAULT_PROGRAM, MODEL_PATH_ENV, MODEL_MARKER_FILE};
use crate::convert::stderr_tail;
use crate::error::{Error, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Splits an input file into stem files.
///
/// Given `track_dir`, an implementation must write each stem it produces
/// to `track_dir/<base>/<stem>.wav`, where `<base>` is the input's file
/// name without extension.
pub trait SeparationBackend: Send + Sync {
    /// Separate `input` into `track_dir` using the model in `model_dir`.
    fn separate(&self, input: &Path, track_dir: &Path, model_dir: &Path) -> Result<()>;

    /// Name of this backend (for logging).
    fn name(&self) -> &'static str;
}

/// Spleeter command-line separator.
///
/// Spleeter resolves `spleeter:<name>` to `$MODEL_PATH/<name>` and only
/// skips its own download when that directory contains [`MODEL_MARKER_FILE`].
#[derive(Debug, Clone)]
pub struct SpleeterBackend {
    program: String,
    descriptor: String,
}

impl SpleeterBackend {
    /// Backend running `program` with the model `descriptor` (e.g. `spleeter:2stems`).
    pub fn new(program: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            descriptor: descriptor.into(),
        }
    }

    /// Model name part of the descriptor.
    pub fn model_name(&self) -> &str {
        self.descriptor
            .rsplit_once(':')
            .map_or(self.descriptor.as_str(), |(_, name)| name)
    }

    fn command(&self, input: &Path, track_dir: &Path, model_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("separate")
            .arg("-p")
            .arg(&self.descriptor)
            .arg("-o")
            .arg(track_dir)
            .arg(input);
        if let Some(models_root) = model_dir.parent() {
            cmd.env(MODEL_PATH_ENV, models_root);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd
    }

    fn mark_model_present(model_dir: &Path) -> std::io::Result<()> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(model_dir.join(MODEL_MARKER_FILE))
            .map(drop)
    }
}

impl Default for SpleeterBackend {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, DEFAULT_DESCRIPTOR)
    }
}

impl SeparationBackend for SpleeterBackend {
    fn separate(&self, input: &Path, track_dir: &Path, model_dir: &Path) -> Result<()> {
        let fail = |reason: String| Error::Separation {
            input: input.to_path_buf(),
            reason,
        };

        if model_dir
            .file_name()
            .is_some_and(|name| name != self.model_name())
        {
            warn!(
                "Model directory {} does not match model name '{}'",
                model_dir.display(),
                self.model_name()
            );
        }
        Self::mark_model_present(model_dir)
            .map_err(|e| fail(format!("cannot write model marker file: {e}")))?;

        let mut cmd = self.command(input, track_dir, model_dir);
        debug!("Running separator: {:?}", cmd);

        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                fail(format!("separator '{}' not found on PATH", self.program))
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

        info!("{} finished for {}", self.program, input.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "spleeter"
    }
}
