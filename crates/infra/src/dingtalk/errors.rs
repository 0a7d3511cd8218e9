//! DingTalk-specific error types
//!
//! Classifies failures from both API hosts before they are folded into the
//! domain error.

use dingbridge_domain::DingBridgeError;
use thiserror::Error;

/// `errcode` values that mean the credential or token was rejected.
const AUTH_ERRCODES: &[i64] = &[40001, 40014, 40089, 42001];

/// Categories of DingTalk failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DingTalkErrorCategory {
    /// Credential or access token rejected
    Authentication,
    /// Request reached the platform and was refused with an error code
    Api,
    /// Non-success HTTP status
    Http,
    /// Connection, timeout or body decoding problems
    Transport,
}

/// DingTalk operation errors
#[derive(Debug, Error)]
pub enum DingTalkError {
    #[error("{0}")]
    Auth(String),

    #[error("{endpoint} failed with errcode {code}: {message}")]
    Api { endpoint: &'static str, code: i64, message: String },

    #[error("{endpoint} returned status {status}: {body}")]
    Http { endpoint: &'static str, status: u16, body: String },

    #[error("failed to decode {endpoint} response: {message}")]
    Decode { endpoint: &'static str, message: String },

    #[error(transparent)]
    Transport(DingBridgeError),
}

impl DingTalkError {
    /// Classify an `{errcode, errmsg}` envelope.
    pub fn from_errcode(endpoint: &'static str, code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        if AUTH_ERRCODES.contains(&code) {
            Self::Auth(format!("{endpoint} rejected credential (errcode {code}): {message}"))
        } else {
            Self::Api { endpoint, code, message }
        }
    }

    /// Classify a non-success HTTP response.
    pub fn from_status(endpoint: &'static str, status: u16, body: String) -> Self {
        if status == 401 || status == 403 {
            Self::Auth(format!("{endpoint} returned status {status}: {body}"))
        } else {
            Self::Http { endpoint, status, body }
        }
    }

    pub fn category(&self) -> DingTalkErrorCategory {
        match self {
            Self::Auth(_) => DingTalkErrorCategory::Authentication,
            Self::Api { .. } => DingTalkErrorCategory::Api,
            Self::Http { .. } => DingTalkErrorCategory::Http,
            Self::Decode { .. } => DingTalkErrorCategory::Transport,
            Self::Transport(err) if matches!(err, DingBridgeError::Auth(_)) => {
                DingTalkErrorCategory::Authentication
            }
            Self::Transport(_) => DingTalkErrorCategory::Transport,
        }
    }
}

impl From<DingBridgeError> for DingTalkError {
    fn from(value: DingBridgeError) -> Self {
        Self::Transport(value)
    }
}

impl From<DingTalkError> for DingBridgeError {
    fn from(value: DingTalkError) -> Self {
        match (value.category(), value) {
            (_, DingTalkError::Transport(err)) => err,
            (DingTalkErrorCategory::Authentication, other) => Self::Auth(other.to_string()),
            (_, other) => Self::Remote(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_errcodes_are_authentication_failures() {
        let err = DingTalkError::from_errcode("gettoken", 40089, "invalid appkey or appsecret");
        assert_eq!(err.category(), DingTalkErrorCategory::Authentication);
        assert!(matches!(DingBridgeError::from(err), DingBridgeError::Auth(_)));
    }

    #[test]
    fn other_errcodes_are_remote_failures() {
        let err = DingTalkError::from_errcode("listsub", 60003, "department not found");
        assert_eq!(err.category(), DingTalkErrorCategory::Api);

        let domain = DingBridgeError::from(err);
        assert_eq!(
            domain,
            DingBridgeError::Remote("listsub failed with errcode 60003: department not found".into())
        );
    }

    #[test]
    fn forbidden_status_is_authentication_failure() {
        assert_eq!(
            DingTalkError::from_status("schemas", 403, "Forbidden.AccessDenied".into()).category(),
            DingTalkErrorCategory::Authentication
        );
        assert_eq!(
            DingTalkError::from_status("schemas", 500, String::new()).category(),
            DingTalkErrorCategory::Http
        );
    }
}
