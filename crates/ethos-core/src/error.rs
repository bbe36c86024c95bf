//! Error types for ETHOS.

use thiserror::Error;

/// A shared error type for the entire ETHOS workspace.
///
/// Variants follow the failure classes of a practice session: validation
/// failures are rejected before any state change, service and persistence
/// failures are transient and retryable, and the rest are internal faults.
#[derive(Error, Debug, Clone)]
pub enum EthosError {
    /// Input rejected before any state change (e.g. choice index out of range)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation not permitted in the controller's current state
    #[error("Invalid state: {operation} is not allowed while {state}")]
    InvalidState { operation: &'static str, state: String },

    /// Scenario service call failed
    #[error("Scenario service error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Service {
        status: Option<u16>,
        message: String,
        retryable: bool,
    },

    /// Persisting a session result failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EthosError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an InvalidState error
    pub fn invalid_state(operation: &'static str, state: impl std::fmt::Display) -> Self {
        Self::InvalidState {
            operation,
            state: state.to_string(),
        }
    }

    /// Creates a Service error
    pub fn service(status: Option<u16>, message: impl Into<String>, retryable: bool) -> Self {
        Self::Service {
            status,
            message: message.into(),
            retryable,
        }
    }

    /// Creates a Persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a Service error
    pub fn is_service(&self) -> bool {
        matches!(self, Self::Service { .. })
    }

    /// Check if this is an InvalidState error
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the user should be offered a retry for this failure.
    ///
    /// Transient network and persistence failures are retryable; a service
    /// error is retryable unless the service said otherwise (4xx responses).
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Service { retryable, .. } => *retryable,
            Self::Persistence(_) | Self::Io { .. } => true,
            _ => false,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for EthosError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for EthosError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for EthosError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for EthosError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (used at the CLI boundary)
impl From<anyhow::Error> for EthosError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, EthosError>`.
pub type Result<T> = std::result::Result<T, EthosError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_display_includes_status() {
        let err = EthosError::service(Some(503), "unavailable", true);
        assert_eq!(
            err.to_string(),
            "Scenario service error (HTTP 503): unavailable"
        );

        let err = EthosError::service(None, "connection refused", true);
        assert_eq!(err.to_string(), "Scenario service error: connection refused");
    }

    #[test]
    fn retryable_classification() {
        assert!(EthosError::service(Some(502), "bad gateway", true).is_retryable());
        assert!(!EthosError::service(Some(400), "bad request", false).is_retryable());
        assert!(EthosError::persistence("save failed").is_retryable());
        assert!(!EthosError::validation("index out of range").is_retryable());
        assert!(!EthosError::invalid_state("submit_choice", "complete").is_retryable());
    }
}
