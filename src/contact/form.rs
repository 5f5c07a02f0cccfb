//! Contact form records and structural (schema) validation.
//!
//! Schema validation runs on the raw, untrusted record right after admission
//! and reports every failing field with Japanese user-facing copy for form
//! re-display. It only checks shape and length; content is neutralised later
//! by [`crate::contact::sanitize`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::contact::email::{is_valid_email, MAX_EMAIL_LENGTH};

pub const MAX_NAME_CHARS: usize = 50;
pub const MAX_COMPANY_CHARS: usize = 100;
pub const MAX_PHONE_CHARS: usize = 20;
pub const MAX_MESSAGE_CHARS: usize = 2000;

static PHONE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9+\-()\s]+$").expect("phone pattern compiles"));

/// Raw submission as received. Every field may be hostile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContactFormInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ContactFormInput {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
            company: None,
            phone: None,
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Record after sanitization: no markup, no line breaks, trimmed, bounded,
/// email lower-cased and valid or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SanitizedContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl SanitizedContactForm {
    /// Field name and value pairs, optional fields only when present.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("message", self.message.as_str()),
        ];
        if let Some(company) = &self.company {
            fields.push(("company", company.as_str()));
        }
        if let Some(phone) = &self.phone {
            fields.push(("phone", phone.as_str()));
        }
        fields
    }
}

/// One failing field and the copy shown next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Check required fields, lengths and formats of a raw submission.
pub fn validate_form(input: &ContactFormInput) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if let Some(company) = present(&input.company) {
        if company.chars().count() > MAX_COMPANY_CHARS {
            errors.push(FieldError::new("company", "会社名は100文字以内で入力してください。"));
        }
    }

    if input.name.trim().is_empty() {
        errors.push(FieldError::new("name", "氏名は必須です。"));
    } else if input.name.chars().count() > MAX_NAME_CHARS {
        errors.push(FieldError::new("name", "氏名は50文字以内で入力してください。"));
    }

    let email = input.email.trim();
    if email.len() > MAX_EMAIL_LENGTH {
        errors.push(FieldError::new(
            "email",
            "メールアドレスは254文字以内で入力してください。",
        ));
    } else if !is_valid_email(email) {
        errors.push(FieldError::new("email", "有効なメールアドレスを入力してください。"));
    }

    if let Some(phone) = present(&input.phone) {
        if phone.chars().count() > MAX_PHONE_CHARS || !PHONE_SHAPE.is_match(phone) {
            errors.push(FieldError::new(
                "phone",
                "電話番号は20文字以内で、数字・+・-・()・スペースのみ使用できます。",
            ));
        }
    }

    if input.message.trim().is_empty() {
        errors.push(FieldError::new("message", "お問い合わせ内容は必須です。"));
    } else if input.message.chars().count() > MAX_MESSAGE_CHARS {
        errors.push(FieldError::new(
            "message",
            "お問い合わせ内容は2000文字以内で入力してください。",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Optional fields submitted as empty strings count as absent.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields_of(result: Result<(), Vec<FieldError>>) -> Vec<&'static str> {
        result.unwrap_err().into_iter().map(|e| e.field).collect()
    }

    #[test]
    fn test_accepts_complete_form() {
        let input = ContactFormInput::new("山田太郎", "yamada@example.com", "お問い合わせです。")
            .with_company("株式会社テスト")
            .with_phone("03-1234-5678");
        assert_eq!(validate_form(&input), Ok(()));
    }

    #[test]
    fn test_rejects_invalid_email() {
        let input = ContactFormInput::new("山田太郎", "invalid-email", "お問い合わせです。");
        let errors = validate_form(&input).unwrap_err();
        assert_eq!(
            errors,
            vec![FieldError::new("email", "有効なメールアドレスを入力してください。")]
        );
    }

    #[test]
    fn test_rejects_oversized_fields() {
        let input = ContactFormInput::new("a".repeat(100), "test@example.com", "a".repeat(2001));
        assert_eq!(fields_of(validate_form(&input)), vec!["name", "message"]);
    }

    #[test]
    fn test_lengths_count_characters_not_bytes() {
        let input = ContactFormInput::new("山".repeat(50), "test@example.com", "あ".repeat(2000));
        assert_eq!(validate_form(&input), Ok(()));
    }

    #[test]
    fn test_whitespace_only_required_fields() {
        let input = ContactFormInput::new("   ", "test@example.com", "\n\t ");
        assert_eq!(fields_of(validate_form(&input)), vec!["name", "message"]);
    }

    #[test]
    fn test_optional_fields() {
        let mut input = ContactFormInput::new("Taro", "taro@example.com", "hi")
            .with_company("")
            .with_phone("");
        assert_eq!(validate_form(&input), Ok(()));

        input.phone = Some("03-1234-5678 ext. 9".into());
        input.company = Some("c".repeat(101));
        assert_eq!(fields_of(validate_form(&input)), vec!["company", "phone"]);
    }

    #[test]
    fn test_missing_json_fields_default_to_empty() {
        let input: ContactFormInput = serde_json::from_str(r#"{"email":"a@example.com"}"#).unwrap();
        assert_eq!(fields_of(validate_form(&input)), vec!["name", "message"]);
    }
}
