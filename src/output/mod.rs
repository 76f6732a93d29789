//! Text and JSON rendering of results.

pub mod json;
pub mod progress;
mod text;

pub use json::{JsonEnvelope, ModelStatus, ResultType, render};
pub use text::{format_analysis, format_file_report, format_stems, format_summary};
