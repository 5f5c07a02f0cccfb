//! Pattern sets shared by the pipeline: header keywords, advisory
//! suspicious-content detection, and the last-line safety predicates applied
//! right before an outbound message is composed.

use once_cell::sync::Lazy;
use regex::Regex;

/// Header names an attacker would try to smuggle into a message.
pub const HEADER_KEYWORDS: [&str; 7] = [
    "bcc:",
    "cc:",
    "to:",
    "from:",
    "subject:",
    "content-type:",
    "mime-version:",
];

/// Advisory pattern family. Hits are logged, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Script,
    EventHandler,
    Xss,
    MailHeader,
    DataUri,
    Sql,
    Shell,
    PathTraversal,
}

impl PatternKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PatternKind::Script => "script",
            PatternKind::EventHandler => "event_handler",
            PatternKind::Xss => "xss",
            PatternKind::MailHeader => "mail_header",
            PatternKind::DataUri => "data_uri",
            PatternKind::Sql => "sql",
            PatternKind::Shell => "shell",
            PatternKind::PathTraversal => "path_traversal",
        }
    }
}

static SUSPICIOUS: Lazy<Vec<(PatternKind, Regex)>> = Lazy::new(|| {
    use PatternKind::*;
    [
        (Script, r"(?i)<script"),
        (Script, r"(?i)javascript:"),
        (Script, r"(?i)vbscript:"),
        (EventHandler, r"(?i)on(?:load|error|click|mouseover|focus)"),
        (EventHandler, r"(?i)\bon[a-z]+\s*="),
        (Xss, r"(?i)(?:eval|expression|alert|confirm|prompt)\("),
        (MailHeader, r"(?i)\b(?:bcc|cc|content-type|mime-version|x-mailer)\s*:"),
        (DataUri, r"(?i)data:(?:text/html|application)"),
        (Sql, r"(?i)union\s+select|drop\s+table|insert\s+into"),
        (Shell, r"(?i)(?:\||;|&&)\s*[a-z]"),
        (Shell, r"`[^`]*`|\$\("),
        (PathTraversal, r"\.\./|\.\.\\"),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).expect("suspicious pattern compiles")))
    .collect()
});

/// Pattern families found in `input`, deduplicated, in table order.
pub fn suspicious_matches(input: &str) -> Vec<PatternKind> {
    let mut kinds: Vec<PatternKind> = Vec::new();
    for (kind, re) in SUSPICIOUS.iter() {
        if !kinds.contains(kind) && re.is_match(input) {
            kinds.push(*kind);
        }
    }
    kinds
}

pub fn contains_suspicious_patterns(input: &str) -> bool {
    !input.is_empty() && SUSPICIOUS.iter().any(|(_, re)| re.is_match(input))
}

static ENCODED_LINE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)%0[ad]|\\r\\n").expect("encoded line break pattern compiles"));

fn contains_header_keyword(value: &str) -> bool {
    let lower = value.to_lowercase();
    HEADER_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Last-line check on an address about to be placed in a header.
pub fn is_email_safe(email: &str) -> bool {
    !email.contains(['<', '>', '\r', '\n']) && !contains_header_keyword(email)
}

/// Last-line check on any value about to be placed in a message.
pub fn is_input_safe_for_email(input: &str) -> bool {
    !input.contains(['\r', '\n'])
        && !ENCODED_LINE_BREAK.is_match(input)
        && !contains_header_keyword(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_script_and_header_patterns() {
        assert!(contains_suspicious_patterns(r#"<script>alert("xss")</script>"#));
        assert!(contains_suspicious_patterns("javascript:void(0)"));
        assert!(contains_suspicious_patterns(r#"onload="malicious()""#));
        assert!(contains_suspicious_patterns("content-type: text/html"));
        assert!(contains_suspicious_patterns("mime-version: 1.0"));
        assert!(contains_suspicious_patterns("1 UNION  SELECT password"));
        assert!(contains_suspicious_patterns("cat x | sh"));
        assert!(contains_suspicious_patterns("../../etc/passwd"));
    }

    #[test]
    fn test_plain_prose_is_not_suspicious() {
        for ok in [
            "",
            "Hello world",
            "山田太郎です",
            "test@example.com",
            "お問い合わせです。料金プランについて教えてください。",
            "Bonjour, je voudrais des informations.",
        ] {
            assert!(!contains_suspicious_patterns(ok), "{ok}");
        }
    }

    #[test]
    fn test_match_kinds_are_deduplicated() {
        assert_eq!(
            suspicious_matches("<script>javascript:eval(1)</script>"),
            vec![PatternKind::Script, PatternKind::Xss]
        );
    }

    #[test]
    fn test_email_safety() {
        assert!(is_email_safe("test@example.com"));
        assert!(is_email_safe("user.name+tag@domain.co.jp"));

        assert!(!is_email_safe("test@example.com\nbcc:hacker@evil.com"));
        assert!(!is_email_safe("test@example.com\rto:hacker@evil.com"));
        assert!(!is_email_safe("test<script>@example.com"));
        assert!(!is_email_safe("Hello\r\nBCC: attacker@evil.com"));
        assert!(!is_email_safe("Subject:x@example.com"));
    }

    #[test]
    fn test_input_safety() {
        assert!(is_input_safe_for_email("Hello world"));
        assert!(is_input_safe_for_email("山田太郎です。よろしくお願いします。"));

        assert!(!is_input_safe_for_email("Hello\r\nBCC: hacker@evil.com"));
        assert!(!is_input_safe_for_email("Test\nSubject: Injected"));
        assert!(!is_input_safe_for_email("content-type: text/html"));
        assert!(!is_input_safe_for_email("Hello%0D%0Aworld"));
        assert!(!is_input_safe_for_email(r"Hello\r\nworld"));
    }
}
