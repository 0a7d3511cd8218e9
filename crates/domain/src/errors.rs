//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for DingBridge
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum DingBridgeError {
    /// Caller-supplied arguments violate a precondition. Raised before any
    /// network call is attempted.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The remote platform rejected the application credential.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Transport or API-level failure talking to the remote platform.
    #[error("Remote error: {0}")]
    Remote(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DingBridgeError {
    /// Stable label for logging and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Auth(_) => "auth",
            Self::Remote(_) => "remote",
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether the error originated on the remote platform side.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::Remote(_))
    }
}

/// Result type alias for DingBridge operations
pub type Result<T> = std::result::Result<T, DingBridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let err = DingBridgeError::Validation("empty recipients".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "Validation");
        assert_eq!(json["message"], "empty recipients");
    }

    #[test]
    fn remote_classification() {
        assert!(DingBridgeError::Auth("bad secret".into()).is_remote());
        assert!(DingBridgeError::Remote("errcode 60011".into()).is_remote());
        assert!(!DingBridgeError::Validation("x".into()).is_remote());
        assert_eq!(DingBridgeError::NotFound("app 7".into()).kind(), "not_found");
    }
}
