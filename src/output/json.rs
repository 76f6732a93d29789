//! JSON envelope for machine-readable CLI output.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Current version of the envelope layout.
pub const SPEC_VERSION: &str = "1.0";

/// Wrapper around every JSON document the CLI prints.
#[derive(Debug, Serialize)]
pub struct JsonEnvelope<T> {
    /// Envelope layout version.
    pub spec_version: String,
    /// Time the document was produced.
    pub timestamp: DateTime<Utc>,
    /// Kind of payload.
    pub result_type: ResultType,
    /// Command-specific payload.
    pub payload: T,
}

impl<T: Serialize> JsonEnvelope<T> {
    /// Envelope stamped with the current time.
    pub fn new(result_type: ResultType, payload: T) -> Self {
        Self {
            spec_version: SPEC_VERSION.to_string(),
            timestamp: Utc::now(),
            result_type,
            payload,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::ReportSerialize { source: e })
    }
}

/// Payload discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    /// Tempo, key and chords of one file.
    Analysis,
    /// Stems of one file.
    Separation,
    /// Batch separation and analysis.
    Process,
    /// Model directory status.
    ModelStatus,
}

/// Model directory status payload.
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    /// Local model directory.
    pub dir: std::path::PathBuf,
    /// Whether the directory holds model files.
    pub provisioned: bool,
    /// Remote archive URL, if configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Serialize `payload` in an envelope.
pub fn render<T: Serialize>(result_type: ResultType, payload: T) -> Result<String> {
    JsonEnvelope::new(result_type, payload).to_json()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisResult, PitchClass};
    use crate::constants::CHORDS_PLACEHOLDER;

    #[test]
    fn test_analysis_envelope() {
        let result = AnalysisResult {
            tempo: 87.5,
            key: PitchClass::DSharp,
            chords: CHORDS_PLACEHOLDER.to_string(),
        };
        let text = render(ResultType::Analysis, &result).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(json["spec_version"], SPEC_VERSION);
        assert_eq!(json["result_type"], "analysis");
        assert_eq!(json["payload"]["key"], "D#");
        assert_eq!(json["payload"]["tempo"], 87.5);
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_model_status_omits_missing_url() {
        let status = ModelStatus {
            dir: "/m/2stems".into(),
            provisioned: false,
            url: None,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["provisioned"], false);
        assert!(json.get("url").is_none());
    }
}
