//! Error types for the Office RAG system.
//!
//! Only the two service-layer kinds (`ServiceUnreachable`, `Generation`) are
//! expected to cross the query pipeline boundary. Out-of-scope questions,
//! missing context and ungrounded output are ordinary results, not errors.

use thiserror::Error;

/// Unified error type for the Office RAG crates.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A backing service (generation or embedding endpoint) could not be reached.
    #[error("Cannot connect to {endpoint}: {message}")]
    ServiceUnreachable { endpoint: String, message: String },

    /// The generation service answered with a non-success status.
    #[error("Generation service returned status {status}: {body}")]
    Generation { status: u16, body: String },

    /// Vector index and retrieval errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Build a `ServiceUnreachable` error for the given endpoint.
    pub fn unreachable(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::ServiceUnreachable {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// True when the failure should be reported as "service unavailable".
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, AppError::ServiceUnreachable { .. })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_carries_endpoint() {
        let err = AppError::unreachable("http://localhost:11434", "connection refused");
        assert!(err.is_service_unavailable());
        assert!(err.to_string().contains("http://localhost:11434"));
    }

    #[test]
    fn test_generation_error_message() {
        let err = AppError::Generation {
            status: 500,
            body: "model not found".to_string(),
        };
        assert!(!err.is_service_unavailable());
        assert_eq!(
            err.to_string(),
            "Generation service returned status 500: model not found"
        );
    }

    #[test]
    fn test_serde_errors_convert() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
