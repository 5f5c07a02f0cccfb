//! Message composition for the two recipients of a submission.
//!
//! The admin notification goes to trusted staff and carries every field plus
//! the client identity; the acknowledgement goes to whatever address the
//! visitor typed, so it carries only their name and a short preview. Both
//! carry a plain-text and an HTML body. Inputs must already be sanitized and
//! checked; values are still HTML-escaped in HTML bodies.

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::config::MailConfig;
use crate::contact::form::SanitizedContactForm;
use crate::mail::EmailMessage;

const JST_OFFSET_SECS: i32 = 9 * 3600;
const PREVIEW_CHARS: usize = 100;
const NOT_PROVIDED: &str = "未入力";

pub struct MessageComposer {
    config: MailConfig,
}

impl MessageComposer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    pub fn admin_notification(
        &self,
        data: &SanitizedContactForm,
        client: &str,
        received_at: DateTime<Utc>,
    ) -> EmailMessage {
        let company = data.company.as_deref().unwrap_or(NOT_PROVIDED);
        let phone = data.phone.as_deref().unwrap_or(NOT_PROVIDED);
        let timestamp = format_timestamp(received_at);

        let text_body = format!(
            "【新しいお問い合わせ】\n\n\
             会社名: {company}\n\
             氏名: {name}\n\
             メールアドレス: {email}\n\
             電話番号: {phone}\n\n\
             お問い合わせ内容:\n{message}\n\n\
             ---\n\
             送信者IP: {client}\n\
             送信日時: {timestamp}\n\n\
             このメールは {site} のウェブサイトから自動送信されました。\n",
            name = data.name,
            email = data.email,
            message = data.message,
            site = self.config.site_name,
        );

        let rows = [
            ("会社名", company),
            ("氏名", data.name.as_str()),
            ("メールアドレス", data.email.as_str()),
            ("電話番号", phone),
            ("お問い合わせ内容", data.message.as_str()),
            ("送信者IP", client),
            ("送信日時", timestamp.as_str()),
        ]
        .iter()
        .map(|(label, value)| {
            format!("<tr><th>{}</th><td>{}</td></tr>", label, escape_html(value))
        })
        .collect::<String>();
        let html_body = format!(
            "<!DOCTYPE html><html><body><h2>新しいお問い合わせ</h2><table>{rows}</table></body></html>"
        );

        EmailMessage {
            from: self.config.from_address.clone(),
            from_name: Some(self.config.site_name.clone()),
            to: self.config.to_addresses.clone(),
            cc: self.config.cc_addresses.clone(),
            bcc: self.config.bcc_addresses.clone(),
            reply_to: Some(data.email.clone()),
            subject: format!("【新しいお問い合わせ】{}様より", data.name),
            text_body,
            html_body: Some(html_body),
        }
    }

    /// `None` when acknowledgements are disabled.
    pub fn acknowledgement(&self, data: &SanitizedContactForm) -> Option<EmailMessage> {
        if !self.config.send_acknowledgement {
            return None;
        }

        let preview = preview(&data.message);
        let mut text_body = format!(
            "{name} 様\n\n\
             お問い合わせありがとうございます。\n\n\
             この度は、{site}にお問い合わせいただき、誠にありがとうございます。\n\
             以下の内容でお問い合わせを受け付けいたしました。\n\n\
             お問い合わせ内容の概要:\n{preview}\n",
            name = data.name,
            site = self.config.site_name,
        );
        let mut html_body = format!(
            "<!DOCTYPE html><html><body>\
             <p>{name} 様</p>\
             <h2>お問い合わせありがとうございます</h2>\
             <p>この度は、{site}にお問い合わせいただき、誠にありがとうございます。<br>\
             以下の内容でお問い合わせを受け付けいたしました。</p>\
             <h3>お問い合わせ内容の概要</h3><p>{preview}</p>",
            name = escape_html(&data.name),
            site = escape_html(&self.config.site_name),
            preview = escape_html(&preview),
        );
        if let Some(url) = &self.config.site_url {
            text_body.push_str(&format!("\n{url}\n"));
            let url = escape_html(url);
            html_body.push_str(&format!(r#"<p><a href="{url}">{url}</a></p>"#));
        }
        html_body.push_str("</body></html>");

        Some(EmailMessage {
            from: self.config.from_address.clone(),
            from_name: Some(self.config.from_name.clone()),
            to: vec![data.email.clone()],
            cc: Vec::new(),
            bcc: Vec::new(),
            reply_to: self.config.to_addresses.first().cloned(),
            subject: format!("お問い合わせ受付完了のお知らせ - {}", self.config.site_name),
            text_body,
            html_body: Some(html_body),
        })
    }
}

fn preview(message: &str) -> String {
    match message.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &message[..idx]),
        None => message.to_string(),
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    let jst = FixedOffset::east_opt(JST_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
    at.with_timezone(&jst).format("%Y-%m-%d %H:%M:%S (JST)").to_string()
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
