//! Outbound mail collaborator.
//!
//! The transport (SMTP, mail API) lives outside this crate. The contact
//! service only needs something that implements [`Mailer`]; it composes the
//! messages itself from an already-checked record (see [`compose`]).
//!
//! [`LogMailer`] is the default implementation: it records the envelope in the
//! log and reports success, which is what local development and tests want.

pub mod compose;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use compose::MessageComposer;

/// Email message handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    #[serde(default)]
    pub from_name: Option<String>,
    pub to: Vec<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    #[serde(default)]
    pub bcc: Vec<String>,
    #[serde(default)]
    pub reply_to: Option<String>,
    pub subject: String,
    pub text_body: String,
    #[serde(default)]
    pub html_body: Option<String>,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// Sends composed messages. Returns the transport's message id.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<String, MailError>;
}

/// Mailer that only logs what would be sent.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<String, MailError> {
        if message.to.is_empty() {
            return Err(MailError::InvalidMessage("no recipients".into()));
        }
        let message_id = format!("<{}@contact-guard>", uuid::Uuid::new_v4());
        tracing::info!(
            message_id = %message_id,
            to = ?message.to,
            cc = message.cc.len(),
            bcc = message.bcc.len(),
            subject = %message.subject,
            "Mail delivered to log transport"
        );
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: Vec<String>) -> EmailMessage {
        EmailMessage {
            from: "no-reply@example.org".into(),
            from_name: None,
            to,
            cc: Vec::new(),
            bcc: Vec::new(),
            reply_to: None,
            subject: "s".into(),
            text_body: "t".into(),
            html_body: None,
        }
    }

    #[tokio::test]
    async fn test_log_mailer_returns_message_id() {
        let id = LogMailer.send(message(vec!["a@example.org".into()])).await.unwrap();
        assert!(id.starts_with('<') && id.ends_with("@contact-guard>"));
    }

    #[tokio::test]
    async fn test_log_mailer_requires_recipient() {
        assert!(matches!(
            LogMailer.send(message(Vec::new())).await,
            Err(MailError::InvalidMessage(_))
        ));
    }
}
