// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as valid bind addresses, non-empty paths, and positive retry counts.

use std::collections::HashSet;

use crate::model::ResonaConfig;

/// A configuration error surfaced to the operator at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A config file or env var failed to parse or deserialize.
    #[error("config parse error: {message}")]
    Parse { message: String },

    /// A deserialized value failed a semantic constraint.
    #[error("invalid config value: {message}")]
    Validation { message: String },
}

/// Render a list of config errors to stderr, one per line.
pub fn render_errors(errors: &[ConfigError]) {
    for error in errors {
        eprintln!("error: {error}");
    }
}

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ResonaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.gateway.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let addr = config.gateway.host.trim();
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{addr}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.gemini.max_attempts < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "gemini.max_attempts must be at least 1, got {}",
                config.gemini.max_attempts
            ),
        });
    }

    if config.gemini.model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gemini.model must not be empty".to_string(),
        });
    }

    let mut seen_keys = HashSet::new();
    for (i, key) in config.gemini.api_keys.iter().enumerate() {
        if key.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("gemini.api_keys[{i}] must not be empty"),
            });
        } else if !seen_keys.insert(key.as_str()) {
            errors.push(ConfigError::Validation {
                message: format!("gemini.api_keys[{i}] duplicates an earlier key"),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = ResonaConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = ResonaConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))
        ));
    }

    #[test]
    fn zero_max_attempts_fails_validation() {
        let mut config = ResonaConfig::default();
        config.gemini.max_attempts = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("max_attempts"))
        ));
    }

    #[test]
    fn duplicate_api_keys_fail_validation() {
        let mut config = ResonaConfig::default();
        config.gemini.api_keys = vec!["key-a".to_string(), "key-a".to_string()];
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("duplicates"))
        ));
    }

    #[test]
    fn invalid_host_fails_validation() {
        let mut config = ResonaConfig::default();
        config.gateway.host = "not a host!".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("gateway.host"))
        ));
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = ResonaConfig::default();
        config.gateway.host = "0.0.0.0".to_string();
        config.storage.database_path = "/tmp/test.db".to_string();
        config.gemini.api_keys = vec!["key-a".to_string(), "key-b".to_string()];
        assert!(validate_config(&config).is_ok());
    }
}
