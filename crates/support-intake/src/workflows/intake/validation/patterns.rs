use std::sync::OnceLock;

use regex::Regex;

// `[0-9]` rather than `\d`: the latter accepts any Unicode decimal digit.
const EMAIL: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PHONE: &str = r"^\+?[1-9][0-9]{0,15}$";

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(EMAIL).expect("email pattern is a valid regex"))
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(PHONE).expect("phone pattern is a valid regex"))
}

pub(crate) fn is_email(value: &str) -> bool {
    email_pattern().is_match(value)
}

pub(crate) fn is_phone(value: &str) -> bool {
    phone_pattern().is_match(value)
}
