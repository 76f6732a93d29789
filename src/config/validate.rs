//! Configuration validation.

use crate::config::Config;
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_model(config)?;
    validate_programs(config)?;
    Ok(())
}

/// Validate model source settings.
fn validate_model(config: &Config) -> Result<()> {
    if let Some(url) = config.model.remote_url()
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        return Err(Error::ConfigValidation {
            message: format!("model url must use http or https, got '{url}'"),
        });
    }

    if let Some(digest) = &config.model.sha256
        && (digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()))
    {
        return Err(Error::ConfigValidation {
            message: "model sha256 must be 64 hex characters".to_string(),
        });
    }

    Ok(())
}

/// Validate external program and encoder settings.
fn validate_programs(config: &Config) -> Result<()> {
    if config.separation.program.trim().is_empty() {
        return Err(Error::ConfigValidation {
            message: "separation program must not be empty".to_string(),
        });
    }

    if config.separation.model_name.trim().is_empty() {
        return Err(Error::ConfigValidation {
            message: "separation model_name must not be empty".to_string(),
        });
    }

    if config.conversion.program.trim().is_empty() {
        return Err(Error::ConfigValidation {
            message: "conversion program must not be empty".to_string(),
        });
    }

    Ok(())
}
