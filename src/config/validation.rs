//! Configuration validation.
//!
//! Serde handles the syntax; this module checks values that parse but make no
//! sense (zero windows, malformed addresses, unreachable admin keys). Every
//! problem is reported, not just the first.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{ServiceConfig, PLACEHOLDER_API_KEY};
use crate::contact::email::is_valid_email;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidBindAddress { field: &'static str, value: String },

    #[error("mail.to_addresses: at least one recipient is required")]
    NoRecipients,

    #[error("{field}: invalid email address {value:?}")]
    InvalidEmail { field: &'static str, value: String },

    #[error("mail.site_url: {0}")]
    InvalidSiteUrl(String),

    #[error("rate_limit.{0} must be greater than zero")]
    ZeroRateLimit(&'static str),

    #[error("admin.api_key must be set when the admin API is enabled")]
    InsecureAdminKey,

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_socket_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.admin.enabled {
        check_socket_addr(&mut errors, "admin.bind_address", &config.admin.bind_address);
        let key = config.admin.api_key.trim();
        if key.is_empty() || key == PLACEHOLDER_API_KEY {
            errors.push(ValidationError::InsecureAdminKey);
        }
    }
    if config.observability.metrics_enabled {
        check_socket_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let mail = &config.mail;
    if mail.to_addresses.is_empty() {
        errors.push(ValidationError::NoRecipients);
    }
    check_emails(&mut errors, "mail.to_addresses", &mail.to_addresses);
    check_emails(&mut errors, "mail.cc_addresses", &mail.cc_addresses);
    check_emails(&mut errors, "mail.bcc_addresses", &mail.bcc_addresses);
    check_emails(&mut errors, "mail.from_address", std::slice::from_ref(&mail.from_address));

    if let Some(site_url) = &mail.site_url {
        match Url::parse(site_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError::InvalidSiteUrl(format!(
                "unsupported scheme {:?}",
                url.scheme()
            ))),
            Err(e) => errors.push(ValidationError::InvalidSiteUrl(e.to_string())),
        }
    }

    let limits = &config.rate_limit;
    if limits.max_requests == 0 {
        errors.push(ValidationError::ZeroRateLimit("max_requests"));
    }
    if limits.window_ms == 0 {
        errors.push(ValidationError::ZeroRateLimit("window_ms"));
    }
    if limits.cleanup_interval_ms == 0 {
        errors.push(ValidationError::ZeroRateLimit("cleanup_interval_ms"));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_socket_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_emails(errors: &mut Vec<ValidationError>, field: &'static str, values: &[String]) {
    for value in values {
        if !is_valid_email(value) {
            errors.push(ValidationError::InvalidEmail {
                field,
                value: value.clone(),
            });
        }
    }
}
