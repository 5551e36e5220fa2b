//! Error types for quarry
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use thiserror::Error;

/// Result type alias for quarry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the query layer
#[derive(Debug, Error)]
pub enum Error {
    /// A clause was dispatched to a container name outside the three valid
    /// targets. This is a programming mistake in client code and is never
    /// reported as an empty result.
    #[error("invalid clause target {0:?} (expected one of: filtered, filter, query)")]
    InvalidTarget(String),

    /// An operator spelling outside the recognized set
    #[error("invalid boolean operator {0:?}")]
    InvalidOperator(String),

    /// A named scope was invoked but never registered for the owner type
    #[error("unknown scope {0:?}")]
    UnknownScope(String),

    /// The owner type's execution hook failed. The underlying error is
    /// carried unchanged; the query layer does not retry or suppress it.
    #[error("backend execution failed: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap an execution-hook failure without losing the original error
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Backend(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display_invalid_target() {
        let err = Error::InvalidTarget("sort".to_string());
        let msg = err.to_string();
        assert!(msg.contains("invalid clause target"));
        assert!(msg.contains("sort"));
        assert!(msg.contains("filtered, filter, query"));
    }

    #[test]
    fn test_error_display_invalid_operator() {
        let err = Error::InvalidOperator("maybe".to_string());
        let msg = err.to_string();
        assert!(msg.contains("invalid boolean operator"));
        assert!(msg.contains("maybe"));
    }

    #[test]
    fn test_error_display_unknown_scope() {
        let err = Error::UnknownScope("recent".to_string());
        let msg = err.to_string();
        assert!(msg.contains("unknown scope"));
        assert!(msg.contains("recent"));
    }

    #[test]
    fn test_error_backend_preserves_source() {
        let inner = io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused");
        let err = Error::backend(inner);
        let msg = err.to_string();
        assert!(msg.contains("backend execution failed"));
        assert!(msg.contains("connection refused"));

        let source = std::error::Error::source(&err);
        assert!(source.is_some());
    }
}
