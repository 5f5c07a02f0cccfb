//! Sanitization of untrusted contact form fields.
//!
//! Every function here is total: it never fails and always returns a
//! best-effort cleaned value, which may be empty. Output is safe to interpolate
//! into plain-text and HTML mail bodies (after HTML escaping) and contains no
//! line breaks, so it cannot start a new header line.
//!
//! Stages, per field:
//! 1. markup removal ([`strip_html`]), with `script`/`style` bodies dropped
//! 2. header-injection neutralisation ([`neutralize_header_injection`])
//! 3. field-specific normalisation (email, phone, name, company, message)
//!
//! All sanitizers are idempotent: feeding their output back in returns it
//! unchanged.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::contact::email::is_valid_email;
use crate::contact::form::{
    present, ContactFormInput, SanitizedContactForm, MAX_COMPANY_CHARS, MAX_NAME_CHARS,
    MAX_PHONE_CHARS,
};

static SCRIPT_OR_STYLE_ELEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
        .expect("element pattern compiles")
});

/// An opening `script`/`style` tag that is never closed swallows the rest.
static UNCLOSED_SCRIPT_OR_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(?:script|style)\b.*$").expect("unclosed pattern compiles"));

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?(?:-->|$)").expect("comment pattern compiles"));

static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[A-Za-z/!?][^<>]*>").expect("tag pattern compiles"));

/// A tag opened at the end of the input and never closed.
static TRAILING_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[A-Za-z/!?][^<>]*$").expect("trailing tag pattern compiles"));

/// Raw CRLF/CR/LF, URL-encoded `%0d`/`%0a`, and literal `\r\n` escapes.
static LINE_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\r\n|\r|\n|%0[ad]|\\r\\n").expect("line break pattern compiles")
});

static LEADING_HEADER_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)^\s*(?:(?:bcc|cc|to|from|subject|content-type|mime-version)\s*:\s*)+",
    )
    .expect("header keyword pattern compiles")
});

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern compiles"));

static NOT_PHONE_CHAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9+\-()\s]").expect("phone filter compiles"));

/// Guard against pathological nesting; each round removes at least one tag.
const MAX_STRIP_ROUNDS: usize = 16;

/// Remove all markup, keeping text content. `script` and `style` elements are
/// dropped together with their bodies. Removal repeats until nothing changes,
/// so fragments such as `<<b>script>` cannot reassemble into a tag.
pub fn strip_html(input: &str) -> String {
    let mut current = input.to_string();
    for _ in 0..MAX_STRIP_ROUNDS {
        let next = strip_html_once(&current);
        if next == current {
            return next;
        }
        current = next;
    }
    // Still changing after the round limit: drop anything tag-like outright.
    current.replace(['<', '>'], "")
}

fn strip_html_once(input: &str) -> String {
    let without_elements = SCRIPT_OR_STYLE_ELEMENT.replace_all(input, "");
    let without_unclosed = UNCLOSED_SCRIPT_OR_STYLE.replace_all(&without_elements, "");
    let without_comments = COMMENT.replace_all(&without_unclosed, "");
    let without_tags = TAG.replace_all(&without_comments, "");
    TRAILING_TAG.replace_all(&without_tags, "").into_owned()
}

/// Neutralise email header injection in free text.
///
/// Null bytes are removed, every line-break form is turned into a single
/// space, header keywords at the start of any line are dropped, and
/// whitespace runs collapse to one space.
pub fn neutralize_header_injection(input: &str) -> String {
    let without_nul = input.replace('\0', "");
    let one_break_kind = LINE_BREAK.replace_all(&without_nul, "\n");
    let without_headers = LEADING_HEADER_KEYWORDS.replace_all(&one_break_kind, "");
    collapse_whitespace(&without_headers)
}

fn collapse_whitespace(input: &str) -> String {
    WHITESPACE_RUN.replace_all(input, " ").trim().to_string()
}

fn truncate_chars(input: &str, max: usize) -> String {
    match input.char_indices().nth(max) {
        Some((idx, _)) => input[..idx].trim_end().to_string(),
        None => input.to_string(),
    }
}

/// Free-text message body.
pub fn sanitize_message(input: &str) -> String {
    let without_nul = input.replace('\0', "");
    neutralize_header_injection(&strip_html(&without_nul))
}

/// Lower-cased, trimmed address, or an empty string when the result is not a
/// valid address. Empty means invalid, never "not provided". Any line break
/// form or NUL left after trimming invalidates the address outright.
pub fn sanitize_email(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.contains('\0') || LINE_BREAK.is_match(trimmed) {
        return String::new();
    }
    let normalized: String = strip_html(trimmed)
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '\t' | '\r' | '\n'))
        .collect();

    if is_valid_email(&normalized) {
        normalized
    } else {
        String::new()
    }
}

/// Digits, `+`, `-`, parentheses and single spaces, at most 20 characters.
pub fn sanitize_phone(input: &str) -> String {
    let stripped = strip_html(&input.replace('\0', ""));
    let filtered = NOT_PHONE_CHAR.replace_all(&stripped, "");
    truncate_chars(&collapse_whitespace(&filtered), MAX_PHONE_CHARS)
}

/// Person name: single line, no angle brackets or quotes, at most 50 characters.
pub fn sanitize_name(input: &str) -> String {
    sanitize_label(input, MAX_NAME_CHARS)
}

/// Company name: as [`sanitize_name`] with a 100 character bound.
pub fn sanitize_company(input: &str) -> String {
    sanitize_label(input, MAX_COMPANY_CHARS)
}

fn sanitize_label(input: &str, max_chars: usize) -> String {
    let stripped = strip_html(&input.replace('\0', ""));
    let without_quotes = stripped.replace(['<', '>', '"', '\''], "");
    truncate_chars(&neutralize_header_injection(&without_quotes), max_chars)
}

/// Sanitize every field of a submission. Absent or empty optional fields stay
/// `None`.
pub fn sanitize_contact_form(input: &ContactFormInput) -> SanitizedContactForm {
    SanitizedContactForm {
        name: sanitize_name(&input.name),
        email: sanitize_email(&input.email),
        message: sanitize_message(&input.message),
        company: present(&input.company).map(sanitize_company),
        phone: present(&input.phone).map(sanitize_phone),
    }
}
