//! Error types for exercise deck generation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating an exercise deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Required input was missing or out of range. Raised before any network call.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// An upstream text or image service failed or returned a non-success status.
    #[error("{service} error{}: {message}", status_suffix(.status))]
    ServiceError {
        /// Which service failed ("text" or "image" generation).
        service: String,
        /// HTTP status code, if a response was received at all.
        status: Option<u16>,
        /// Upstream body text or transport error message.
        message: String,
    },

    /// Failed to assemble or write the final deck artifact.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML writing or parsing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),

    /// Invalid configuration or missing credentials.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Build a service error for the given upstream service.
    pub fn service(service: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::ServiceError {
            service: service.into(),
            status,
            message: message.into(),
        }
    }

    /// Whether this error is a per-word service failure that a skip policy may absorb.
    pub fn is_service_error(&self) -> bool {
        matches!(self, Self::ServiceError { .. })
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {})", code),
        None => String::new(),
    }
}

/// A text-generation reply that could not be read as exactly two decoy words.
///
/// Carries whatever words could be recovered so the caller can build a
/// degraded slide instead of aborting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecoyParseError {
    /// The reply contained no JSON object with a `confusion_words` list.
    #[error("reply is not a confusion_words object: {0}")]
    Malformed(String),

    /// The reply parsed, but held fewer than two usable words.
    #[error("expected 2 decoy words, found {}", .recovered.len())]
    TooFew {
        /// Words that were present in the reply.
        recovered: Vec<String>,
    },
}

impl DecoyParseError {
    /// Words salvaged from the reply (empty for a malformed reply).
    pub fn recovered(&self) -> &[String] {
        match self {
            Self::Malformed(_) => &[],
            Self::TooFew { recovered } => recovered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_display_includes_status() {
        let err = Error::service("image", Some(402), "payment required");
        assert_eq!(err.to_string(), "image error (status 402): payment required");

        let err = Error::service("text", None, "connection refused");
        assert_eq!(err.to_string(), "text error: connection refused");
    }

    #[test]
    fn test_recovered_words() {
        let err = DecoyParseError::TooFew {
            recovered: vec!["elasticity".to_string()],
        };
        assert_eq!(err.recovered(), ["elasticity".to_string()]);
        assert!(DecoyParseError::Malformed("x".into()).recovered().is_empty());
    }
}
