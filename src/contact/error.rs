//! Submission failure taxonomy.

use axum::http::StatusCode;
use thiserror::Error;

use crate::contact::form::FieldError;
use crate::mail::MailError;
use crate::security::RateLimitResult;

#[derive(Debug, Error)]
pub enum ContactError {
    /// Admit check refused. Recoverable: the client retries later.
    #[error("rate limited: {}", .0.error.as_deref().unwrap_or("limit reached"))]
    RateLimited(RateLimitResult),

    /// Structural field violations, reported per field.
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// Security rejection. `reason` is for logs only.
    #[error("rejected {field}: {reason}")]
    Rejected { field: &'static str, reason: &'static str },

    #[error("delivery failed: {0}")]
    Delivery(#[from] MailError),
}

impl ContactError {
    /// Value of the `error_type` field on security log events.
    pub fn error_type(&self) -> &'static str {
        match self {
            ContactError::RateLimited(_) => "RATE_LIMIT",
            ContactError::Validation(_) => "VALIDATION",
            ContactError::Rejected { .. } => "SECURITY",
            ContactError::Delivery(_) => "DELIVERY",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ContactError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ContactError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ContactError::Rejected { .. } => StatusCode::BAD_REQUEST,
            ContactError::Delivery(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Copy shown to the visitor. Never names the detection that fired.
    pub fn user_message(&self) -> &'static str {
        match self {
            ContactError::RateLimited(_) => {
                "送信頻度が高すぎます。しばらく時間をおいてから再度お試しください。"
            }
            ContactError::Validation(_) => "入力内容を確認してください。",
            ContactError::Rejected { .. } => {
                "入力内容に問題があります。正しい形式で入力してください。"
            }
            ContactError::Delivery(_) => {
                "メール送信中にエラーが発生しました。しばらく時間をおいてから再度お試しください。"
            }
        }
    }

    /// Per-field errors, only for validation failures.
    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            ContactError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_message_is_generic() {
        let err = ContactError::Rejected { field: "message", reason: "header keyword present" };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_type(), "SECURITY");
        assert!(!err.user_message().contains("header"));
        assert!(err.field_errors().is_none());
    }

    #[test]
    fn test_delivery_from_mail_error() {
        let err: ContactError = MailError::Transport("connection refused".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "delivery failed: transport error: connection refused");
    }
}
