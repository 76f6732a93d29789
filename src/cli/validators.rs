//! CLI argument validators.

/// Parse a model archive URL. An empty value is accepted and disables
/// remote provisioning.
pub fn parse_model_url(s: &str) -> Result<String, String> {
    let value = s.trim();
    if value.is_empty() || value.starts_with("http://") || value.starts_with("https://") {
        Ok(value.to_string())
    } else {
        Err(format!("model URL must use http or https, got '{value}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_url_valid() {
        assert_eq!(
            parse_model_url("https://example.com/2stems.tar.gz").ok(),
            Some("https://example.com/2stems.tar.gz".to_string())
        );
        assert_eq!(parse_model_url(" ").ok(), Some(String::new()));
    }

    #[test]
    fn test_parse_model_url_invalid() {
        assert!(parse_model_url("file:///tmp/model.zip").is_err());
        assert!(parse_model_url("example.com").is_err());
    }
}
