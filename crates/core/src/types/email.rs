//! Email address type.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Shape accepted for an email address: something, `@`, something, `.`,
/// something, with no whitespace and no second `@` anywhere.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input does not look like `local@domain.tld`.
    #[error("invalid email format")]
    InvalidFormat,
}

/// An email address.
///
/// ## Constraints
///
/// - Not empty; no length limit beyond the pattern
/// - Matches `^[^\s@]+@[^\s@]+\.[^\s@]+$`: exactly one `@`, no whitespace,
///   and a dot somewhere after the `@` with text on both sides
///
/// ## Examples
///
/// ```
/// use caprichos_core::Email;
///
/// // Valid emails
/// assert!(Email::parse("a@b.co").is_ok());
/// assert!(Email::parse("user.name+tag@domain.co.uk").is_ok());
///
/// // Invalid emails
/// assert!(Email::parse("").is_err());             // empty
/// assert!(Email::parse("no-at-symbol").is_err()); // missing @
/// assert!(Email::parse("user@domain").is_err());  // no dot in domain
/// assert!(Email::parse("a b@c.de").is_err());     // whitespace
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Parse an `Email` from a string.
    ///
    /// The input is not trimmed: surrounding whitespace makes it invalid.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or does not match the
    /// accepted shape.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if !EMAIL_PATTERN.is_match(s) {
            return Err(EmailError::InvalidFormat);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the domain part of the email (after the @).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_emails() {
        assert!(Email::parse("user@example.com").is_ok());
        assert!(Email::parse("user+tag@example.com").is_ok());
        assert!(Email::parse("user@subdomain.example.com").is_ok());
        assert!(Email::parse("a@b.co").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
    }

    #[test]
    fn test_parse_accepts_long_addresses() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert_eq!(long.len(), 262);
        assert_eq!(Email::parse(&long).unwrap().as_str(), long);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in [
            "no-at-symbol",
            "@domain.com",
            "user@",
            "user@domain",
            "user@domain.",
            "us er@domain.com",
            "user@@domain.com",
            " user@domain.com",
        ] {
            assert_eq!(
                Email::parse(input),
                Err(EmailError::InvalidFormat),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_domain() {
        let email = Email::parse("user@example.com").unwrap();
        assert_eq!(email.domain(), "example.com");
    }

    #[test]
    fn test_deserialize_validates() {
        let parsed: Email = serde_json::from_str("\"user@example.com\"").unwrap();
        assert_eq!(parsed.as_str(), "user@example.com");

        let rejected = serde_json::from_str::<Email>("\"nope\"");
        assert!(rejected.is_err());
    }
}
