//! Redaction of personal data before it reaches log output.
//!
//! Player contacts are phone numbers and pick tokens are opaque credentials;
//! neither may appear verbatim in logs.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

pub struct PiiRegexRegistry;

impl PiiRegexRegistry {
    pub fn email() -> &'static Regex {
        static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            #[allow(clippy::unwrap_used)]
            Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{1,}\b").unwrap()
        });
        &EMAIL_REGEX
    }

    /// International or local phone numbers with at least 8 digits.
    pub fn phone() -> &'static Regex {
        static PHONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            #[allow(clippy::unwrap_used)]
            Regex::new(r"\+?\d[\d ]{6,}\d").unwrap()
        });
        &PHONE_REGEX
    }

    /// Alphanumeric runs of 16+ characters (pick tokens are 32).
    pub fn opaque_token() -> &'static Regex {
        static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            #[allow(clippy::unwrap_used)]
            Regex::new(r"\b[A-Za-z0-9+/]{16,}={0,2}\b").unwrap()
        });
        &TOKEN_REGEX
    }
}

/// Mask emails (first character of the local part kept), phone numbers
/// (last two digits kept) and opaque tokens.
pub fn redact(input: &str) -> String {
    let emails = PiiRegexRegistry::email().replace_all(input, |caps: &regex::Captures| {
        let full = &caps[0];
        match full.find('@') {
            Some(0) | None => full.to_string(),
            Some(at) => format!("{}***{}", &full[..1], &full[at..]),
        }
    });

    let tokens = PiiRegexRegistry::opaque_token().replace_all(&emails, "[REDACTED_TOKEN]");

    PiiRegexRegistry::phone()
        .replace_all(&tokens, |caps: &regex::Captures| {
            let digits: Vec<char> = caps[0].chars().filter(char::is_ascii_digit).collect();
            let tail: String = digits[digits.len().saturating_sub(2)..].iter().collect();
            format!("[PHONE ..{tail}]")
        })
        .to_string()
}

/// Display wrapper that redacts on format.
pub struct Redacted<'a>(pub &'a str);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}
