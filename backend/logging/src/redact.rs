//! Log Redaction
//!
//! Scrubs credentials and phone numbers from user text and error messages
//! before they reach a log sink.

use regex::Regex;
use std::sync::LazyLock;

static REDACTIONS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)bearer\s+[a-z0-9\-\._~+/]+=*", "[REDACTED_TOKEN]"),
        (r"\b(?:sk|hf)[-_][a-zA-Z0-9]{16,}\b", "[REDACTED_TOKEN]"),
        (r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b", "[REDACTED_PHONE]"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    REDACTIONS
        .iter()
        .fold(input.to_string(), |text, (re, replacement)| {
            re.replace_all(&text, *replacement).into_owned()
        })
}
