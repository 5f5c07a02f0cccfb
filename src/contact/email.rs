//! Email address syntax check.
//!
//! Accepts the dot-atom form that real mailboxes use: an ASCII local part of
//! at most 64 characters without leading, trailing or doubled dots, and a
//! hostname with at least two labels and an alphabetic TLD. Quoted local
//! parts, IP literals and bare whitespace are refused. Total length is capped
//! at 254 characters.

use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_EMAIL_LENGTH: usize = 254;
const MAX_LOCAL_LENGTH: usize = 64;
const MAX_LABEL_LENGTH: usize = 63;

static LOCAL_PART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*$")
        .expect("local part pattern compiles")
});

static DOMAIN_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?$").expect("label pattern compiles")
});

static TLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Za-z]{2,}|xn--[A-Za-z0-9-]+)$").expect("tld pattern compiles"));

pub fn is_valid_email(value: &str) -> bool {
    if value.is_empty() || value.len() > MAX_EMAIL_LENGTH {
        return false;
    }

    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || local.len() > MAX_LOCAL_LENGTH || !LOCAL_PART.is_match(local) {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let all_labels_ok = labels
        .iter()
        .all(|label| label.len() <= MAX_LABEL_LENGTH && DOMAIN_LABEL.is_match(label));

    all_labels_ok && labels.last().is_some_and(|tld| TLD.is_match(tld))
}
