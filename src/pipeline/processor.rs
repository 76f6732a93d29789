//! Per-file results of a combined separation and analysis run.

use crate::analysis::AnalysisResult;
use crate::error::{Error, Stage};
use crate::separate::StemSet;
use serde::Serialize;
use std::path::PathBuf;

/// A stage that failed for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageFailure {
    /// Stage the error came from.
    pub stage: Stage,
    /// Error message with its source chain.
    pub message: String,
}

impl From<&Error> for StageFailure {
    fn from(err: &Error) -> Self {
        Self {
            stage: err.stage(),
            message: err.report(),
        }
    }
}

/// Outcome of separating and analyzing one file.
///
/// Separation and analysis run independently; either may fail without
/// preventing the other.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// Input file.
    pub input: PathBuf,
    /// Separated stems, if separation succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stems: Option<StemSet>,
    /// Analysis, if it succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
    /// Failed stages.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<StageFailure>,
}

impl FileReport {
    /// Empty report for `input`.
    pub const fn new(input: PathBuf) -> Self {
        Self {
            input,
            stems: None,
            analysis: None,
            failures: Vec::new(),
        }
    }

    /// Whether every stage succeeded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Totals over a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessSummary {
    /// One report per input, in input order.
    pub files: Vec<FileReport>,
    /// Files where every stage succeeded.
    pub succeeded: usize,
    /// Files with at least one failed stage.
    pub failed: usize,
}

impl ProcessSummary {
    /// Summarize `files`.
    pub fn from_reports(files: Vec<FileReport>) -> Self {
        let succeeded = files.iter().filter(|r| r.is_success()).count();
        let failed = files.len() - succeeded;
        Self {
            files,
            succeeded,
            failed,
        }
    }
}
