//! Human-readable rendering.

use crate::analysis::AnalysisResult;
use crate::pipeline::{FileReport, ProcessSummary};
use crate::separate::StemSet;
use std::fmt::Write;

/// Three-line analysis summary.
pub fn format_analysis(result: &AnalysisResult) -> String {
    format!(
        "Tempo: {:.2} BPM\nKey: {}\nChords: {}",
        result.tempo, result.key, result.chords
    )
}

/// One line per produced stem, with both file paths.
pub fn format_stems(stems: &StemSet) -> String {
    if stems.is_empty() {
        return "No stems produced".to_string();
    }
    let mut out = String::new();
    for (stem, files) in stems.iter() {
        let _ = writeln!(
            out,
            "{stem}: {} ({})",
            files.compressed.display(),
            files.lossless.display()
        );
    }
    out.truncate(out.trim_end().len());
    out
}

/// Block describing one processed file.
pub fn format_file_report(report: &FileReport) -> String {
    let mut out = format!("== {} ==\n", report.input.display());
    if let Some(stems) = &report.stems {
        out.push_str(&format_stems(stems));
        out.push('\n');
    }
    if let Some(analysis) = &report.analysis {
        out.push_str(&format_analysis(analysis));
        out.push('\n');
    }
    for failure in &report.failures {
        let _ = writeln!(out, "Error during {}: {}", failure.stage, failure.message);
    }
    out
}

/// All file blocks followed by a totals line.
pub fn format_summary(summary: &ProcessSummary) -> String {
    let mut out = String::new();
    for report in &summary.files {
        out.push_str(&format_file_report(report));
        out.push('\n');
    }
    let _ = write!(
        out,
        "{} succeeded, {} failed",
        summary.succeeded, summary.failed
    );
    out
}
