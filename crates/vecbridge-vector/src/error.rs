//! Vector store error types.

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for vector store operations.
pub type VectorResult<T> = Result<T, VectorError>;

/// Vector store errors.
#[derive(Debug, Error, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum VectorError {
    /// The service did not answer the liveness probe.
    ///
    /// Raised before the requested operation is attempted.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// A similarity search came back without a match list.
    #[error("no matches found in collection '{collection}'")]
    NoMatches { collection: String },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Transport or remote error raised by the backend client.
    #[error(transparent)]
    Backend(BoxedError),
}

impl VectorError {
    /// Creates an unavailability error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Creates an empty-result error for the given collection.
    pub fn no_matches(collection: impl Into<String>) -> Self {
        Self::NoMatches {
            collection: collection.into(),
        }
    }

    /// Creates an invalid config error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Wraps a backend error without translating it.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }

    /// Returns `true` if the liveness guard rejected the operation.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// Returns the error kind as a static string, for structured logging.
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind() {
        assert_eq!(VectorError::unavailable("down").kind(), "unavailable");
        assert_eq!(VectorError::no_matches("docs").kind(), "no_matches");
    }

    #[test]
    fn test_backend_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = VectorError::backend(io);
        assert_eq!(err.to_string(), "refused");
        assert!(!err.is_unavailable());
    }

    #[test]
    fn test_no_matches_message() {
        let err = VectorError::no_matches("docs");
        assert_eq!(err.to_string(), "no matches found in collection 'docs'");
    }
}
