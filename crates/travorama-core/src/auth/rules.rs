//! Client-side input rules for the login form.
//!
//! The form only consumes these as predicates: a validator returns an error
//! message or nothing, and the phone helpers answer "is this a phone number"
//! and "what is it without the country prefix".

use std::sync::LazyLock;

use regex::Regex;

use crate::config::LoginConfig;

// Pattern is a literal; compilation cannot fail.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Shortest national significant number accepted as a phone.
const MIN_SUBSCRIBER_DIGITS: usize = 7;
/// Longest national significant number accepted as a phone.
const MAX_SUBSCRIBER_DIGITS: usize = 13;

pub const IDENTIFIER_REQUIRED: &str = "Email or phone number is required";
pub const IDENTIFIER_INVALID: &str = "Enter a valid email or phone number";
pub const SECRET_REQUIRED: &str = "Password is required";

/// Field validators used before a submission is allowed.
pub trait Validator: Send + Sync {
    /// Returns an error message if the identifier cannot be submitted.
    fn validate_identifier(&self, identifier: &str) -> Option<String>;

    /// Returns an error message if the password cannot be submitted.
    fn validate_secret(&self, secret: &str) -> Option<String>;

    /// Returns true if the identifier should be sent as a phone number.
    fn is_phone_format(&self, identifier: &str) -> bool;
}

/// Phone number normalization.
pub trait PhoneFormatter: Send + Sync {
    /// Removes the leading country or trunk prefix from a phone identifier.
    fn strip_country_code(&self, phone: &str) -> String;
}

/// Default rules for the single supported country.
#[derive(Debug, Clone)]
pub struct FormRules {
    country_code: String,
}

impl FormRules {
    pub fn new(country_code: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
        }
    }

    pub fn from_config(config: &LoginConfig) -> Self {
        Self::new(config.country_code.trim())
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// Returns the digits after the country code or trunk `0`, if the input
    /// has one of those prefixes.
    fn subscriber_part<'a>(&self, normalized: &'a str) -> Option<&'a str> {
        if let Some(rest) = normalized.strip_prefix('+') {
            return rest.strip_prefix(self.country_code.as_str());
        }
        normalized
            .strip_prefix(self.country_code.as_str())
            .or_else(|| normalized.strip_prefix('0'))
    }
}

impl Default for FormRules {
    fn default() -> Self {
        Self::new(LoginConfig::DEFAULT_COUNTRY_CODE)
    }
}

/// Drops the separators people type inside phone numbers.
fn normalize_phone(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

pub fn is_email_format(identifier: &str) -> bool {
    EMAIL_RE.is_match(identifier.trim())
}

impl Validator for FormRules {
    fn validate_identifier(&self, identifier: &str) -> Option<String> {
        if identifier.trim().is_empty() {
            return Some(IDENTIFIER_REQUIRED.to_string());
        }
        if is_email_format(identifier) || self.is_phone_format(identifier) {
            None
        } else {
            Some(IDENTIFIER_INVALID.to_string())
        }
    }

    fn validate_secret(&self, secret: &str) -> Option<String> {
        if secret.is_empty() {
            Some(SECRET_REQUIRED.to_string())
        } else {
            None
        }
    }

    fn is_phone_format(&self, identifier: &str) -> bool {
        let normalized = normalize_phone(identifier);
        self.subscriber_part(&normalized).is_some_and(|digits| {
            (MIN_SUBSCRIBER_DIGITS..=MAX_SUBSCRIBER_DIGITS).contains(&digits.len())
                && digits.chars().all(|c| c.is_ascii_digit())
        })
    }
}

impl PhoneFormatter for FormRules {
    fn strip_country_code(&self, phone: &str) -> String {
        let normalized = normalize_phone(phone);
        match self.subscriber_part(&normalized) {
            Some(rest) => rest.to_string(),
            None => normalized,
        }
    }
}
