//! Error types for the valuation workflow.

use thiserror::Error;

/// Errors that can occur during a valuation session.
///
/// Nothing here is fatal to the process: every failure is scoped to a
/// single stage attempt and leaves prior stage outputs intact.
#[derive(Error, Debug)]
pub enum ValuationError {
    /// A local precondition was not met. Never involves a network call;
    /// recoverable by correcting the input and retrying.
    #[error("Invalid input: {0}")]
    Input(String),

    /// A remote capability returned a non-success response or the
    /// transport failed. Safe to retry.
    #[error("Remote call to {service} failed: {message}")]
    Remote { service: String, message: String },

    /// A remote capability answered, but the payload did not match the
    /// expected shape.
    #[error("Unexpected response from {service}: {message}")]
    DataShape { service: String, message: String },

    /// Document rendering failed.
    #[error("Document rendering failed: {0}")]
    Render(String),

    /// Serialization error
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ValuationError {
    /// Build an `Input` error from any displayable message.
    pub fn input(message: impl Into<String>) -> Self {
        ValuationError::Input(message.into())
    }

    /// Build a `Remote` error for the named service.
    pub fn remote(service: impl Into<String>, message: impl Into<String>) -> Self {
        ValuationError::Remote {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Build a `DataShape` error for the named service.
    pub fn data_shape(service: impl Into<String>, message: impl Into<String>) -> Self {
        ValuationError::DataShape {
            service: service.into(),
            message: message.into(),
        }
    }
}

/// Result type for valuation operations
pub type Result<T> = std::result::Result<T, ValuationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValuationError::input("no images");
        assert_eq!(err.to_string(), "Invalid input: no images");

        let err = ValuationError::remote("room-scorer", "HTTP 503");
        assert_eq!(err.to_string(), "Remote call to room-scorer failed: HTTP 503");
    }
}
