//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::output::OutputFormat;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    ///
    /// Connection values are not checked here: they may come from the
    /// environment and are resolved when the model client is created.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.input.extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "input.extensions must list at least one extension".into(),
            ));
        }
        if self.model.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "model.timeout_ms must be > 0".into(),
            ));
        }
        if self.model.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "model.max_tokens must be > 0".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ConfigError::ValidationError(
                "model.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.pacing.requests_per_interval == 0 {
            return Err(ConfigError::ValidationError(
                "pacing.requests_per_interval must be > 0".into(),
            ));
        }
        if self.pacing.interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "pacing.interval_ms must be > 0".into(),
            ));
        }
        if OutputFormat::parse(&self.output.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "output.format must be \"text\" or \"jsonl\", got \"{}\"",
                self.output.format
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_extensions() {
        let mut config = Config::default();
        config.input.extensions.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("input.extensions"));
    }

    #[test]
    fn test_validate_rejects_zero_pacing() {
        let mut config = Config::default();
        config.pacing.requests_per_interval = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("requests_per_interval"));

        let mut config = Config::default();
        config.pacing.interval_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("interval_ms"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.model.timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_invalid_temperature() {
        let mut config = Config::default();
        config.model.temperature = 2.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("temperature"));

        config.model.temperature = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_every_parseable_output_format() {
        for format in ["text", "console", "jsonl", "JSONL", "jsonlines", "ndjson"] {
            let mut config = Config::default();
            config.output.format = format.to_string();
            assert!(config.validate().is_ok(), "{format} rejected");
        }
    }

    #[test]
    fn test_validate_rejects_unknown_output_format() {
        let mut config = Config::default();
        config.output.format = "xml".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("output.format"));
    }
}
