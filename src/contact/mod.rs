//! Contact form subsystem.
//!
//! # Data Flow
//! ```text
//! Raw ContactFormInput (untrusted)
//!     → security::RateLimiter::check (admit before any work)
//!     → form.rs (schema validation, per-field Japanese copy)
//!     → sanitize.rs (strip markup, neutralise header injection, normalise)
//!     → review.rs (re-validate required fields, advisory pattern scan)
//!     → patterns.rs (last-line safety predicates)
//!     → mail::MessageComposer → mail::Mailer
//! ```
//!
//! # Design Decisions
//! - One consolidated pipeline; every stage is a pure function
//! - Sanitization never fails, it returns a best-effort value
//! - Rejections after sanitization are security events with generic user copy
//! - Suspicious patterns are logged, never rejected

pub mod email;
pub mod error;
pub mod form;
pub mod patterns;
pub mod review;
pub mod sanitize;
pub mod service;

pub use email::is_valid_email;
pub use error::ContactError;
pub use form::{validate_form, ContactFormInput, FieldError, SanitizedContactForm};
pub use patterns::{contains_suspicious_patterns, is_email_safe, is_input_safe_for_email};
pub use review::{review_sanitized, ReviewReport, SanitizationIssue, SuspiciousField};
pub use sanitize::sanitize_contact_form;
pub use service::{ContactService, Receipt, Submission};
