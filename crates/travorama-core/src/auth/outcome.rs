//! Results of the login call and their user-facing messages.

use std::fmt;

use serde_json::Value;

pub const MSG_INVALID_PASSWORD: &str = "Incorrect password";
pub const MSG_SERVER_ERROR: &str = "A server error occurred";

/// Result of a completed login request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The server accepted the credentials.
    Success,
    /// The server rejected the credentials with a code.
    Failure(AuthErrorCode),
}

/// Rejection codes reported by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    NotRegistered,
    InvalidPassword,
    Unrecognized(String),
}

impl AuthErrorCode {
    /// Parses a server code. Accepts both `NOT_REGISTERED` and the
    /// `ERR_`-prefixed spelling the API actually returns.
    pub fn parse(code: &str) -> Self {
        let trimmed = code.trim();
        let bare = trimmed.strip_prefix("ERR_").unwrap_or(trimmed);
        match bare {
            "NOT_REGISTERED" => AuthErrorCode::NotRegistered,
            "INVALID_PASSWORD" => AuthErrorCode::InvalidPassword,
            _ => AuthErrorCode::Unrecognized(trimmed.to_string()),
        }
    }

    /// Maps the code to the message shown under the form.
    pub fn message(&self, identifier: &str) -> String {
        match self {
            AuthErrorCode::NotRegistered => format!("Account {identifier} not found"),
            AuthErrorCode::InvalidPassword => MSG_INVALID_PASSWORD.to_string(),
            AuthErrorCode::Unrecognized(_) => MSG_SERVER_ERROR.to_string(),
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthErrorCode::NotRegistered => f.write_str("NOT_REGISTERED"),
            AuthErrorCode::InvalidPassword => f.write_str("INVALID_PASSWORD"),
            AuthErrorCode::Unrecognized(code) => f.write_str(code),
        }
    }
}

/// Category of a failed login request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    HttpStatus,
    Decode,
    Other,
}

/// A login request that produced no usable answer.
///
/// Logged for diagnostics; the user only ever sees the generic server message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    /// One-line summary
    pub message: String,
    /// Optional additional details (e.g., raw body)
    pub details: Option<String>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an HTTP status error, keeping a non-empty body as details.
    pub fn http_status(status: u16, body: &str) -> Self {
        let mut message = format!("HTTP {status}");
        if let Ok(json) = serde_json::from_str::<Value>(body)
            && let Some(msg) = json.get("message").and_then(Value::as_str)
        {
            message = format!("HTTP {status}: {msg}");
        }
        Self {
            kind: TransportErrorKind::HttpStatus,
            message,
            details: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    pub fn decode(message: impl Into<String>, body: &str) -> Self {
        Self {
            kind: TransportErrorKind::Decode,
            message: message.into(),
            details: (!body.is_empty()).then(|| body.to_string()),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else if err.is_decode() {
            TransportErrorKind::Decode
        } else {
            TransportErrorKind::Other
        };
        Self::new(kind, err.to_string())
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TransportError {}

/// Message for the submission error line, from either a rejection or a
/// transport failure.
pub fn submission_message(
    result: &Result<AuthOutcome, TransportError>,
    identifier: &str,
) -> Option<String> {
    match result {
        Ok(AuthOutcome::Success) => None,
        Ok(AuthOutcome::Failure(code)) => Some(code.message(identifier)),
        Err(_) => Some(MSG_SERVER_ERROR.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_both_spellings() {
        assert_eq!(
            AuthErrorCode::parse("NOT_REGISTERED"),
            AuthErrorCode::NotRegistered
        );
        assert_eq!(
            AuthErrorCode::parse("ERR_NOT_REGISTERED"),
            AuthErrorCode::NotRegistered
        );
        assert_eq!(
            AuthErrorCode::parse("ERR_INVALID_PASSWORD"),
            AuthErrorCode::InvalidPassword
        );
        assert_eq!(
            AuthErrorCode::parse("ERR_TOO_MANY_ATTEMPTS"),
            AuthErrorCode::Unrecognized("ERR_TOO_MANY_ATTEMPTS".to_string())
        );
    }

    #[test]
    fn test_message_table() {
        assert_eq!(
            AuthErrorCode::NotRegistered.message("ghost@example.com"),
            "Account ghost@example.com not found"
        );
        assert_eq!(
            AuthErrorCode::InvalidPassword.message("user@example.com"),
            "Incorrect password"
        );
        assert_eq!(
            AuthErrorCode::Unrecognized("X".to_string()).message("u"),
            "A server error occurred"
        );
    }

    #[test]
    fn test_submission_message_for_transport_error_is_generic() {
        let result = Err(TransportError::timeout("request timed out after 30s"));
        assert_eq!(
            submission_message(&result, "user@example.com").as_deref(),
            Some(MSG_SERVER_ERROR)
        );
        assert_eq!(submission_message(&Ok(AuthOutcome::Success), "u"), None);
    }

    #[test]
    fn test_http_status_extracts_message() {
        let err = TransportError::http_status(503, r#"{"message":"maintenance"}"#);
        assert_eq!(err.kind, TransportErrorKind::HttpStatus);
        assert_eq!(err.to_string(), "HTTP 503: maintenance");
        assert!(err.details.is_some());

        let bare = TransportError::http_status(502, "");
        assert_eq!(bare.to_string(), "HTTP 502");
        assert_eq!(bare.details, None);
    }
}
