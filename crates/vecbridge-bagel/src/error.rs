//! Error types for vecbridge-bagel.

use thiserror::Error;
use vecbridge_vector::VectorError;

/// Result type alias for vecbridge-bagel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the BagelDB client.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Invalid endpoint URL.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The service answered with a non-success status.
    #[error("BagelDB API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The service answered with a body that does not match the API.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration errors.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an API error from a status code and response body.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns the HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<Error> for VectorError {
    fn from(err: Error) -> Self {
        match err {
            Error::Config(message) => VectorError::invalid_config(message),
            err => VectorError::backend(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status() {
        let err = Error::api(404, "cluster not found");
        assert_eq!(err.status(), Some(404));
        assert_eq!(
            err.to_string(),
            "BagelDB API error (404): cluster not found"
        );
    }

    #[test]
    fn test_into_vector_error() {
        let err: VectorError = Error::api(500, "boom").into();
        assert!(matches!(err, VectorError::Backend(_)));
        assert_eq!(err.to_string(), "BagelDB API error (500): boom");

        let err: VectorError = Error::invalid_config("empty host").into();
        assert!(matches!(err, VectorError::InvalidConfig(_)));
    }

    #[test]
    fn test_decode_error_stays_backend() {
        let decode = serde_json::from_str::<u32>("\"seven\"").unwrap_err();
        let err: VectorError = Error::from(decode).into();

        assert_eq!(err.kind(), "backend");
        assert!(err.to_string().starts_with("Serialization error:"));
    }
}
