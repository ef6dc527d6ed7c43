//! Request field validation helpers.

use once_cell::sync::Lazy;
use regex::Regex;

/// `local@domain.tld`, no whitespace, exactly one `@`.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Returns the trimmed value, or `None` when the field is absent or blank.
pub fn required(field: Option<&str>) -> Option<&str> {
    field.map(str::trim).filter(|value| !value.is_empty())
}

/// Checks the basic `local@domain.tld` shape
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Canonical stored form of an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
