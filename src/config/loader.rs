//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GuardConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the TOML config file for the relay binary.
pub const CONFIG_PATH_ENV_VAR: &str = "CONTACT_GUARD_CONFIG";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<GuardConfig, ConfigError> {
    let config: GuardConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GuardConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load from `CONTACT_GUARD_CONFIG` when set, defaults otherwise.
pub fn load_from_env() -> Result<GuardConfig, ConfigError> {
    match std::env::var(CONFIG_PATH_ENV_VAR) {
        Ok(path) if !path.trim().is_empty() => load_config(Path::new(&path)),
        _ => Ok(GuardConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [threats]
            spam_terms = ["lottery"]
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.threats.spam_terms, vec!["lottery".to_string()]);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = parse_config("[rate_limit]\nwindow_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errs) if errs.len() == 1));
        assert!(err.to_string().contains("rate_limit.window_secs"));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = parse_config("[rate_limit\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
