//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

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

/// Load, override from the environment and validate a TOML config file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    finish(config)
}

/// Parse TOML text without touching the environment or validating.
pub fn parse_config(content: &str) -> Result<ServiceConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

impl ServiceConfig {
    /// Defaults plus environment overrides, validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        finish(ServiceConfig::default())
    }
}

fn finish(mut config: ServiceConfig) -> Result<ServiceConfig, ConfigError> {
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply deployment overrides. `lookup` abstracts the environment for tests.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(list) = non_empty("CONTACT_FORM_TO_EMAIL") {
        config.mail.to_addresses = split_list(&list);
    }
    if let Some(list) = non_empty("CONTACT_FORM_CC_EMAIL") {
        config.mail.cc_addresses = split_list(&list);
    }
    if let Some(list) = non_empty("CONTACT_FORM_BCC_EMAIL") {
        config.mail.bcc_addresses = split_list(&list);
    }
    if let Some(from) = non_empty("CONTACT_FORM_FROM_EMAIL") {
        config.mail.from_address = from.trim().to_string();
    }
    if let Some(url) = non_empty("SITE_URL") {
        config.mail.site_url = Some(url.trim().to_string());
    }
    if let Some(key) = non_empty("ADMIN_API_KEY") {
        config.admin.api_key = key;
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let config = parse_config(
            r#"
            [rate_limit]
            max_requests = 3

            [mail]
            to_addresses = ["office@example.org"]
            "#,
        )
        .unwrap();

        assert_eq!(config.rate_limit.max_requests, 3);
        assert_eq!(config.rate_limit.window_ms, 60_000);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.mail.to_addresses, vec!["office@example.org"]);
    }

    #[test]
    fn test_env_overrides_split_lists() {
        let env: HashMap<&str, &str> = [
            ("CONTACT_FORM_TO_EMAIL", "a@example.org, b@example.org"),
            ("CONTACT_FORM_BCC_EMAIL", " audit@example.org "),
            ("SITE_URL", "https://example.org"),
            ("CONTACT_FORM_CC_EMAIL", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = ServiceConfig::default();
        config.mail.cc_addresses = vec!["keep@example.org".into()];
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.mail.to_addresses, vec!["a@example.org", "b@example.org"]);
        assert_eq!(config.mail.bcc_addresses, vec!["audit@example.org"]);
        assert_eq!(config.mail.cc_addresses, vec!["keep@example.org"]);
        assert_eq!(config.mail.site_url.as_deref(), Some("https://example.org"));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        assert!(matches!(
            parse_config("[rate_limit\nmax_requests = 1"),
            Err(ConfigError::Parse(_))
        ));
    }
}
