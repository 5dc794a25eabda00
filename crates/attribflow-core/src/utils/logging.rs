/// Logging utilities for PII redaction
///
/// Customer emails flow through every endpoint; logs keep only the domain
/// part so normal traffic stays GDPR-quiet.
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b").unwrap());

/// Redacts email addresses from text, preserving the domain for debugging
///
/// # Examples
/// ```
/// use attribflow_core::utils::logging::redact_email;
///
/// assert_eq!(redact_email("user@example.com"), "***@example.com");
/// ```
pub fn redact_email(text: &str) -> String {
    EMAIL_PATTERN
        .replace_all(text, |caps: &regex::Captures| {
            let email = &caps[0];
            if let Some(at_pos) = email.find('@') {
                format!("***{}", &email[at_pos..])
            } else {
                "***@***".to_string()
            }
        })
        .to_string()
}

/// Extracts the domain from an email address for safe logging
pub fn email_domain(email: &str) -> String {
    email.split('@').nth(1).unwrap_or("unknown").to_string()
}
