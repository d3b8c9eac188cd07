//! Error types for the shroud transport.

use thiserror::Error;

/// Result type alias for shroud operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while establishing or using a covert connection.
#[derive(Error, Debug)]
pub enum Error {
    /// ClientHello fabrication failed (unknown profile entry, malformed
    /// template). Fatal for the current handshake attempt.
    #[error("client hello fabrication failed: {0}")]
    Fabrication(String),

    /// The underlying transport failed. Propagated unchanged; the caller
    /// decides whether to retry.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The server's response did not authenticate. Conclusive rejection;
    /// retrying on the same connection would leak a timing signal.
    #[error("authentication failed")]
    Authentication,

    /// A pipe deadline elapsed. No data was lost.
    #[error("deadline exceeded")]
    Timeout,

    /// Write attempted on a closed pipe.
    #[error("pipe closed")]
    PipeClosed,

    /// A cryptographic primitive failed (entropy source, key agreement).
    /// Retryable with a fresh attempt.
    #[error("cryptographic failure: {0}")]
    Crypto(String),

    /// Configuration rejected before any network activity.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new fabrication error.
    pub fn fabrication(msg: impl Into<String>) -> Self {
        Error::Fabrication(msg.into())
    }

    /// Create a new cryptographic error.
    pub fn crypto(msg: impl Into<String>) -> Self {
        Error::Crypto(msg.into())
    }

    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Check if this error is a conclusive authentication rejection.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Error::Authentication)
    }
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        use std::io::ErrorKind;
        match err {
            Error::Transport(io) => io,
            Error::Timeout => std::io::Error::new(ErrorKind::TimedOut, err.to_string()),
            Error::PipeClosed => std::io::Error::new(ErrorKind::BrokenPipe, err.to_string()),
            other => std::io::Error::new(ErrorKind::Other, other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::Authentication.to_string(), "authentication failed");
        assert_eq!(Error::Timeout.to_string(), "deadline exceeded");
        assert_eq!(Error::PipeClosed.to_string(), "pipe closed");
    }

    #[test]
    fn test_auth_failure_predicate() {
        assert!(Error::Authentication.is_auth_failure());
        assert!(!Error::Timeout.is_auth_failure());
        assert!(!Error::fabrication("x").is_auth_failure());
    }

    #[test]
    fn test_io_conversion_kinds() {
        let io: std::io::Error = Error::Timeout.into();
        assert_eq!(io.kind(), std::io::ErrorKind::TimedOut);

        let io: std::io::Error = Error::PipeClosed.into();
        assert_eq!(io.kind(), std::io::ErrorKind::BrokenPipe);
    }
}
