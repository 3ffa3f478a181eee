// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./resona.toml` > `~/.config/resona/resona.toml` > `/etc/resona/resona.toml`
//! with environment variable overrides via `RESONA_` prefix. API keys may
//! additionally be supplied through `GEMINI_API_KEY`, `GEMINI_API_KEY_2`, ...

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ResonaConfig;

/// Highest numbered `GEMINI_API_KEY_<n>` variable that is consulted.
const MAX_NUMBERED_KEYS: u32 = 8;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/resona/resona.toml` (system-wide)
/// 3. `~/.config/resona/resona.toml` (user XDG config)
/// 4. `./resona.toml` (local directory)
/// 5. `RESONA_*` environment variables
pub fn load_config() -> Result<ResonaConfig, figment::Error> {
    let mut config: ResonaConfig = Figment::new()
        .merge(Serialized::defaults(ResonaConfig::default()))
        .merge(Toml::file("/etc/resona/resona.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("resona/resona.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("resona.toml"))
        .merge(env_provider())
        .extract()?;
    append_env_api_keys(&mut config);
    Ok(config)
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit config file specification.
pub fn load_config_from_str(toml_content: &str) -> Result<ResonaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ResonaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ResonaConfig, figment::Error> {
    let mut config: ResonaConfig = Figment::new()
        .merge(Serialized::defaults(ResonaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()?;
    append_env_api_keys(&mut config);
    Ok(config)
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// CRITICAL: Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `RESONA_STORAGE_DATABASE_PATH`
/// must map to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("RESONA_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: RESONA_GEMINI_MAX_ATTEMPTS -> "gemini_max_attempts"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("gemini_", "gemini.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}

/// Append API keys from `GEMINI_API_KEY` and `GEMINI_API_KEY_2..=8` to the pool.
///
/// Keys already present in the config (from TOML) are kept; env keys are
/// appended in numeric order, skipping blanks and duplicates. This mirrors
/// the common deployment pattern of one key per env var.
fn append_env_api_keys(config: &mut ResonaConfig) {
    let mut names = vec!["GEMINI_API_KEY".to_string()];
    names.extend((2..=MAX_NUMBERED_KEYS).map(|n| format!("GEMINI_API_KEY_{n}")));

    merge_api_keys(config, names.iter().filter_map(|n| std::env::var(n).ok()));
}

fn merge_api_keys(config: &mut ResonaConfig, values: impl IntoIterator<Item = String>) {
    for value in values {
        let value = value.trim();
        if !value.is_empty() && !config.gemini.api_keys.iter().any(|k| k == value) {
            config.gemini.api_keys.push(value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_toml_is_empty() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.agent.name, "resona");
        assert_eq!(config.gemini.model, "gemini-1.5-flash");
        assert_eq!(config.gemini.max_attempts, 3);
        assert_eq!(config.gemini.cooldown_secs, 300);
        assert!(config.gemini.api_keys.is_empty());
        assert_eq!(config.gateway.port, 8787);
    }

    #[test]
    fn toml_values_override_defaults() {
        let config = load_config_from_str(
            r#"
[gemini]
api_keys = ["key-one", "key-two"]
model = "gemini-1.5-pro"
max_attempts = 5

[gateway]
host = "0.0.0.0"
port = 9000
"#,
        )
        .unwrap();
        assert_eq!(config.gemini.api_keys, vec!["key-one", "key-two"]);
        assert_eq!(config.gemini.model, "gemini-1.5-pro");
        assert_eq!(config.gemini.max_attempts, 5);
        assert_eq!(config.gateway.host, "0.0.0.0");
        assert_eq!(config.gateway.port, 9000);
        // Untouched sections keep their defaults.
        assert_eq!(config.gemini.cooldown_secs, 300);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = load_config_from_str(
            r#"
[gemini]
api_kies = ["oops"]
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn merge_api_keys_skips_duplicates_and_blanks() {
        let mut config = ResonaConfig::default();
        config.gemini.api_keys = vec!["from-toml".to_string()];

        // Exercised directly rather than through process env, which races
        // with other tests.
        merge_api_keys(
            &mut config,
            ["from-toml", "  ", "from-env"].map(String::from),
        );
        assert_eq!(config.gemini.api_keys, vec!["from-toml", "from-env"]);
    }
}
