//! Transport error types
//!
//! Defines all errors that can occur while talking to the REST API.

use thiserror::Error;

/// Errors that can occur when communicating with the journal API
#[derive(Error, Debug)]
pub enum TransportError {
    /// Server could not be reached
    #[error("API unavailable")]
    Unavailable,

    /// Request exceeded the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// Any other HTTP client failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or expired session
    #[error("Unauthorized")]
    Unauthorized,

    /// Response body did not match the expected shape
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Request was rejected locally before being sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl TransportError {
    /// Classify a reqwest error the same way for every call
    pub(crate) fn from_send(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Unavailable
        } else {
            TransportError::Request(err)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TransportError::NotFound(_))
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Decode(err.to_string())
    }
}

/// Result type alias for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TransportError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error 500: boom");

        let err = TransportError::NotFound("entry 9".to_string());
        assert_eq!(err.to_string(), "Not found: entry 9");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<u64>("nope").unwrap_err();
        let err: TransportError = json_err.into();
        assert!(matches!(err, TransportError::Decode(_)));
    }
}
