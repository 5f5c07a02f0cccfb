//! Submission service: the full pipeline from admit check to delivery.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;

use crate::config::MailConfig;
use crate::contact::error::ContactError;
use crate::contact::form::{validate_form, ContactFormInput, SanitizedContactForm};
use crate::contact::patterns::{is_email_safe, is_input_safe_for_email};
use crate::contact::review::{review_sanitized, SuspiciousField};
use crate::contact::sanitize::sanitize_contact_form;
use crate::mail::{Mailer, MessageComposer};
use crate::observability::metrics;
use crate::security::{RateLimitResult, RateLimiter};

/// Successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledgement_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<SuspiciousField>,
}

/// Outcome of one submission. The admit decision is always present so the
/// caller can emit rate-limit headers whatever happened afterwards.
#[derive(Debug)]
pub struct Submission {
    pub rate_limit: RateLimitResult,
    pub result: Result<Receipt, ContactError>,
}

pub struct ContactService {
    limiter: Arc<RateLimiter>,
    mailer: Arc<dyn Mailer>,
    composer: MessageComposer,
}

impl ContactService {
    pub fn new(limiter: Arc<RateLimiter>, mailer: Arc<dyn Mailer>, mail: MailConfig) -> Self {
        Self {
            limiter,
            mailer,
            composer: MessageComposer::new(mail),
        }
    }

    pub async fn submit(&self, client: &str, input: ContactFormInput) -> Submission {
        let started = Instant::now();
        let rate_limit = self.limiter.check(client);

        let result = if rate_limit.admitted {
            self.process(client, &input).await
        } else {
            metrics::record_rate_limited();
            Err(ContactError::RateLimited(rate_limit.clone()))
        };

        match &result {
            Ok(receipt) => {
                metrics::record_submission("accepted");
                tracing::info!(
                    client = %client,
                    message_id = %receipt.message_id,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Contact submission delivered"
                );
            }
            Err(e) => {
                metrics::record_submission(outcome_label(e));
                log_failure(client, e);
            }
        }

        Submission { rate_limit, result }
    }

    async fn process(
        &self,
        client: &str,
        input: &ContactFormInput,
    ) -> Result<Receipt, ContactError> {
        validate_form(input).map_err(ContactError::Validation)?;

        let data = sanitize_contact_form(input);
        let report = review_sanitized(&data);
        if let Some(issue) = report.errors.first() {
            return Err(ContactError::Rejected {
                field: issue.field(),
                reason: issue.describe(),
            });
        }

        for warning in &report.warnings {
            metrics::record_suspicious_input(warning.field);
            tracing::warn!(
                client = %client,
                error_type = "SECURITY",
                field = warning.field,
                patterns = ?warning.patterns,
                "Suspicious patterns detected"
            );
        }

        check_outbound_safety(&data)?;

        let notification = self.composer.admin_notification(&data, client, Utc::now());
        let message_id = self.mailer.send(notification).await?;

        let acknowledgement_id = match self.composer.acknowledgement(&data) {
            Some(ack) => match self.mailer.send(ack).await {
                Ok(id) => Some(id),
                Err(e) => {
                    tracing::warn!(
                        client = %client,
                        error_type = "DELIVERY",
                        error = %e,
                        "Acknowledgement not delivered"
                    );
                    None
                }
            },
            None => None,
        };

        Ok(Receipt {
            message_id,
            acknowledgement_id,
            warnings: report.warnings,
        })
    }
}

/// Last-line predicates on values about to enter a message.
fn check_outbound_safety(data: &SanitizedContactForm) -> Result<(), ContactError> {
    if !is_email_safe(&data.email) {
        return Err(ContactError::Rejected {
            field: "email",
            reason: "unsafe address",
        });
    }
    for (field, value) in data.fields() {
        if !is_input_safe_for_email(value) {
            return Err(ContactError::Rejected {
                field,
                reason: "header injection attempt",
            });
        }
    }
    Ok(())
}

fn outcome_label(err: &ContactError) -> &'static str {
    match err {
        ContactError::RateLimited(_) => "rate_limited",
        ContactError::Validation(_) => "invalid",
        ContactError::Rejected { .. } => "rejected",
        ContactError::Delivery(_) => "delivery_failed",
    }
}

fn log_failure(client: &str, err: &ContactError) {
    let error_type = err.error_type();
    match err {
        ContactError::RateLimited(result) => tracing::warn!(
            client = %client,
            error_type,
            retry_after_secs = result.retry_after_secs,
            "Rate limit exceeded"
        ),
        ContactError::Validation(errors) => tracing::warn!(
            client = %client,
            error_type,
            fields = ?errors.iter().map(|e| e.field).collect::<Vec<_>>(),
            "Form validation failed"
        ),
        ContactError::Rejected { field, reason } => tracing::error!(
            client = %client,
            error_type,
            field = *field,
            reason = *reason,
            "Submission rejected"
        ),
        ContactError::Delivery(e) => tracing::error!(
            client = %client,
            error_type,
            error = %e,
            "Mail delivery failed"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;
    use crate::mail::{EmailMessage, MailError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<EmailMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: EmailMessage) -> Result<String, MailError> {
            if self.fail {
                return Err(MailError::Transport("connection refused".into()));
            }
            let mut sent = self.sent.lock().unwrap();
            sent.push(message);
            Ok(format!("<{}@test>", sent.len()))
        }
    }

    fn service(mailer: Arc<RecordingMailer>) -> ContactService {
        let limiter = Arc::new(RateLimiter::new(RateLimitConfig::default()));
        let mail = MailConfig {
            to_addresses: vec!["office@example.org".into()],
            ..MailConfig::default()
        };
        ContactService::new(limiter, mailer, mail)
    }

    fn valid() -> ContactFormInput {
        ContactFormInput::new("山田太郎", "yamada@example.com", "お問い合わせです。")
    }

    #[tokio::test]
    async fn test_accepted_submission_sends_both_messages() {
        let mailer = Arc::new(RecordingMailer::default());
        let outcome = service(mailer.clone()).submit("10.0.0.1", valid()).await;

        assert!(outcome.rate_limit.admitted);
        let receipt = outcome.result.unwrap();
        assert_eq!(receipt.message_id, "<1@test>");
        assert_eq!(receipt.acknowledgement_id.as_deref(), Some("<2@test>"));

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent[0].to, vec!["office@example.org"]);
        assert_eq!(sent[1].to, vec!["yamada@example.com"]);
    }

    #[tokio::test]
    async fn test_validation_failure_sends_nothing() {
        let mailer = Arc::new(RecordingMailer::default());
        let input = ContactFormInput::new("", "yamada@example.com", "hi");
        let outcome = service(mailer.clone()).submit("10.0.0.1", input).await;

        let err = outcome.result.unwrap_err();
        assert_eq!(err.field_errors().unwrap()[0].field, "name");
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_markup_only_name_is_rejected() {
        let mailer = Arc::new(RecordingMailer::default());
        let input = ContactFormInput::new("<b></b>", "yamada@example.com", "hi");
        let outcome = service(mailer.clone()).submit("10.0.0.1", input).await;

        assert!(matches!(
            outcome.result,
            Err(ContactError::Rejected { field: "name", .. })
        ));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_header_keyword_in_message_is_rejected() {
        let mailer = Arc::new(RecordingMailer::default());
        let input = ContactFormInput::new("Taro", "taro@example.com", "please cc: my boss");
        let outcome = service(mailer.clone()).submit("10.0.0.1", input).await;

        assert!(matches!(
            outcome.result,
            Err(ContactError::Rejected { field: "message", .. })
        ));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_encoded_line_break_in_email_never_reaches_mailer() {
        let mailer = Arc::new(RecordingMailer::default());
        let input = ContactFormInput::new("Taro", "victim%0d%0abcc@example.com", "hi");
        assert_eq!(validate_form(&input), Ok(()));

        let outcome = service(mailer.clone()).submit("10.0.0.1", input).await;
        assert!(matches!(
            outcome.result,
            Err(ContactError::Rejected { field: "email", .. })
        ));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_outbound_check_covers_email_field() {
        let record = SanitizedContactForm {
            name: "Taro".into(),
            email: "victim%0abcc@example.com".into(),
            message: "hi".into(),
            company: None,
            phone: None,
        };
        assert!(is_email_safe(&record.email));
        assert!(matches!(
            check_outbound_safety(&record),
            Err(ContactError::Rejected { field: "email", .. })
        ));
    }

    #[tokio::test]
    async fn test_suspicious_content_is_delivered_with_warnings() {
        let mailer = Arc::new(RecordingMailer::default());
        let input = ContactFormInput::new("Taro", "taro@example.com", "see ../docs please");
        let receipt = service(mailer).submit("10.0.0.1", input).await.result.unwrap();

        assert_eq!(receipt.warnings.len(), 1);
        assert_eq!(receipt.warnings[0].field, "message");
    }

    #[tokio::test]
    async fn test_delivery_failure_maps_to_delivery_error() {
        let mailer = Arc::new(RecordingMailer { fail: true, ..Default::default() });
        let outcome = service(mailer).submit("10.0.0.1", valid()).await;

        assert!(outcome.rate_limit.admitted);
        assert!(matches!(outcome.result, Err(ContactError::Delivery(_))));
    }
}
