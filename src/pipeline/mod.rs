//! Separation and analysis facade.

mod coordinator;
mod processor;

pub use coordinator::{ProcessOptions, collect_input_files, is_audio_file};
pub use processor::{FileReport, ProcessSummary, StageFailure};

use crate::analysis::{AnalysisResult, AudioAnalyzer};
use crate::audio::AudioAsset;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::progress;
use crate::separate::{StemLayout, StemSeparator, StemSet};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Separator and analyzer sharing one configuration.
#[derive(Debug)]
pub struct Pipeline {
    separator: StemSeparator,
    analyzer: AudioAnalyzer,
    stems_dir: PathBuf,
}

impl Pipeline {
    /// Pipeline over explicit components.
    pub fn new(separator: StemSeparator, analyzer: AudioAnalyzer, stems_dir: PathBuf) -> Self {
        Self {
            separator,
            analyzer,
            stems_dir,
        }
    }

    /// Spleeter, ffmpeg and the default analyzer, configured from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            StemSeparator::from_config(config)?,
            AudioAnalyzer::default(),
            config.separation.stems_dir.clone(),
        ))
    }

    /// Default output root for stems.
    pub fn stems_dir(&self) -> &Path {
        &self.stems_dir
    }

    /// Separate `input` under the configured stems directory.
    pub fn separate(&self, input: &Path) -> Result<StemSet> {
        self.separate_into(input, &self.stems_dir)
    }

    /// Separate `input` under `output_root`.
    pub fn separate_into(&self, input: &Path, output_root: &Path) -> Result<StemSet> {
        self.separator.separate(input, output_root)
    }

    /// Tempo, key and chords of `input`.
    pub fn analyze(&self, input: &Path) -> Result<AnalysisResult> {
        self.analyzer.analyze(input)
    }

    /// Separate and analyze every file.
    ///
    /// Failures are recorded per file and processing continues, unless
    /// `fail_fast` is set, in which case the first error is returned.
    ///
    /// Inputs sharing a base name map to the same `O/B` directory. Only the
    /// first of them is separated; the others fail with
    /// [`Error::OutputCollision`] and are still analyzed.
    pub fn process(&self, inputs: &[PathBuf], options: &ProcessOptions) -> Result<ProcessSummary> {
        let start = Instant::now();
        let bar = progress::create_file_progress(inputs.len(), options.progress);
        let mut reports = Vec::with_capacity(inputs.len());
        let mut claimed = HashMap::new();

        for input in inputs {
            let (report, mut errors) = self.run_file(input, &options.output_root, &mut claimed);
            if options.fail_fast && !errors.is_empty() {
                progress::finish_progress(bar, "Failed");
                return Err(errors.remove(0));
            }
            reports.push(report);
            progress::inc_progress(bar.as_ref());
        }
        progress::finish_progress(bar, "Complete");

        let summary = ProcessSummary::from_reports(reports);
        info!(
            "Complete: {} succeeded, {} failed in {:.2}s",
            summary.succeeded,
            summary.failed,
            start.elapsed().as_secs_f64()
        );
        if summary.failed > 0 {
            warn!("{} file(s) had errors", summary.failed);
        }
        Ok(summary)
    }

    fn run_file(
        &self,
        input: &Path,
        output_root: &Path,
        claimed: &mut HashMap<PathBuf, PathBuf>,
    ) -> (FileReport, Vec<Error>) {
        let mut report = FileReport::new(input.to_path_buf());
        let mut errors = Vec::new();

        let separated = claim_track_dir(claimed, input, output_root)
            .and_then(|()| self.separate_into(input, output_root));
        match separated {
            Ok(stems) => report.stems = Some(stems),
            Err(e) => {
                error!("Error during separation of {}: {}", input.display(), e.report());
                report.failures.push(StageFailure::from(&e));
                errors.push(e);
            }
        }

        match self.analyze(input) {
            Ok(analysis) => report.analysis = Some(analysis),
            Err(e) => {
                error!("Error during analysis of {}: {}", input.display(), e.report());
                report.failures.push(StageFailure::from(&e));
                errors.push(e);
            }
        }

        (report, errors)
    }
}

/// Record that `input` owns its `O/B` directory for this batch.
///
/// The same file listed twice keeps its claim.
fn claim_track_dir(
    claimed: &mut HashMap<PathBuf, PathBuf>,
    input: &Path,
    output_root: &Path,
) -> Result<()> {
    let asset = AudioAsset::open(input)?;
    let track_dir = StemLayout::new(&asset, output_root).track_dir().to_path_buf();
    match claimed.entry(track_dir) {
        Entry::Occupied(owner) if owner.get() != asset.path() => Err(Error::OutputCollision {
            input: input.to_path_buf(),
            other: owner.get().clone(),
            track_dir: owner.key().clone(),
        }),
        Entry::Occupied(_) => Ok(()),
        Entry::Vacant(slot) => {
            slot.insert(asset.path().to_path_buf());
            Ok(())
        }
    }
}
