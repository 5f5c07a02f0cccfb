//! Post-sanitization re-validation and advisory pattern review.
//!
//! Sanitization may legitimately empty a field (a name that was all markup, an
//! address that stopped being valid). Any such loss on a required field is a
//! hard rejection. Suspicious patterns that survive sanitization are only
//! reported as warnings.

use serde::Serialize;

use crate::contact::email::is_valid_email;
use crate::contact::form::SanitizedContactForm;
use crate::contact::patterns::suspicious_matches;

/// Why a sanitized record cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SanitizationIssue {
    EmptyName,
    EmptyEmail,
    EmptyMessage,
    InvalidEmail,
}

impl SanitizationIssue {
    pub fn field(self) -> &'static str {
        match self {
            SanitizationIssue::EmptyName => "name",
            SanitizationIssue::EmptyEmail | SanitizationIssue::InvalidEmail => "email",
            SanitizationIssue::EmptyMessage => "message",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            SanitizationIssue::EmptyName => "name is empty after sanitization",
            SanitizationIssue::EmptyEmail => "email is empty after sanitization",
            SanitizationIssue::EmptyMessage => "message is empty after sanitization",
            SanitizationIssue::InvalidEmail => "email is invalid after sanitization",
        }
    }
}

/// Advisory finding on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuspiciousField {
    pub field: &'static str,
    pub patterns: Vec<&'static str>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewReport {
    pub is_valid: bool,
    pub errors: Vec<SanitizationIssue>,
    pub warnings: Vec<SuspiciousField>,
}

/// Re-validate a sanitized record and scan every field for suspicious content.
pub fn review_sanitized(data: &SanitizedContactForm) -> ReviewReport {
    let mut errors = Vec::new();

    if data.name.trim().is_empty() {
        errors.push(SanitizationIssue::EmptyName);
    }
    if data.email.trim().is_empty() {
        errors.push(SanitizationIssue::EmptyEmail);
    } else if !is_valid_email(&data.email) {
        errors.push(SanitizationIssue::InvalidEmail);
    }
    if data.message.trim().is_empty() {
        errors.push(SanitizationIssue::EmptyMessage);
    }

    let warnings = data
        .fields()
        .into_iter()
        .filter_map(|(field, value)| {
            let kinds = suspicious_matches(value);
            (!kinds.is_empty()).then(|| SuspiciousField {
                field,
                patterns: kinds.into_iter().map(|k| k.as_str()).collect(),
            })
        })
        .collect();

    ReviewReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}
