//! Separation orchestration: provision, separate, convert.

use crate::audio::AudioAsset;
use crate::config::Config;
use crate::convert::{FfmpegEncoder, Transcoder};
use crate::error::{Error, Result};
use crate::provision::SeparationModel;
use crate::separate::{SeparationBackend, SpleeterBackend, Stem, StemFiles, StemLayout, StemSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Splits audio files into vocal and accompaniment stems.
pub struct StemSeparator {
    model: SeparationModel,
    backend: Box<dyn SeparationBackend>,
    transcoder: Box<dyn Transcoder>,
}

impl StemSeparator {
    /// Separator over explicit components.
    pub fn new(
        model: SeparationModel,
        backend: impl SeparationBackend + 'static,
        transcoder: impl Transcoder + 'static,
    ) -> Self {
        Self {
            model,
            backend: Box::new(backend),
            transcoder: Box::new(transcoder),
        }
    }

    /// Spleeter and ffmpeg configured from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let model = SeparationModel::from_config(&config.model)?;
        let backend = SpleeterBackend::new(
            config.separation.program.clone(),
            config.separation.model_name.clone(),
        );
        let transcoder = FfmpegEncoder::new(config.conversion.program.clone());
        Ok(Self::new(model, backend, transcoder))
    }

    /// Separate `input` into stems under `output_root/<base>/<base>/`.
    ///
    /// Stems the backend did not produce are omitted from the result. A
    /// conversion failure on a produced stem fails the whole call.
    pub fn separate(&self, input: &Path, output_root: &Path) -> Result<StemSet> {
        let asset = AudioAsset::open(input)?;

        info!(
            "Separating {} with {}",
            asset.path().display(),
            self.backend.name()
        );
        self.model.ensure()?;

        let layout = StemLayout::new(&asset, output_root);
        fs::create_dir_all(layout.track_dir()).map_err(|e| Error::OutputDirCreateFailed {
            path: layout.track_dir().to_path_buf(),
            source: e,
        })?;

        self.backend
            .separate(asset.path(), layout.track_dir(), self.model.dir())?;

        let mut stems = StemSet::default();
        for stem in Stem::ALL {
            let lossless = layout.lossless_path(stem);
            if !lossless.is_file() {
                debug!("No {stem} stem at {}", lossless.display());
                continue;
            }
            let compressed = self
                .transcoder
                .to_compressed(&lossless, &layout.compressed_path(stem))?;
            stems.insert(
                stem,
                StemFiles {
                    lossless,
                    compressed,
                },
            );
        }

        info!(
            "Stems saved at {} ({} of {})",
            layout.stem_dir().display(),
            stems.len(),
            Stem::ALL.len()
        );
        Ok(stems)
    }
}

impl std::fmt::Debug for StemSeparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StemSeparator")
            .field("model", &self.model)
            .field("backend", &self.backend.name())
            .field("transcoder", &self.transcoder.name())
            .finish()
    }
}
