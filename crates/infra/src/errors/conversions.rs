//! Conversions from external infrastructure errors into domain errors.

use dingbridge_domain::DingBridgeError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub DingBridgeError);

impl From<InfraError> for DingBridgeError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<DingBridgeError> for InfraError {
    fn from(value: DingBridgeError) -> Self {
        InfraError(value)
    }
}

trait IntoDingBridgeError {
    fn into_dingbridge(self) -> DingBridgeError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → DingBridgeError */
/* -------------------------------------------------------------------------- */

impl IntoDingBridgeError for SqlError {
    fn into_dingbridge(self) -> DingBridgeError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        DingBridgeError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        DingBridgeError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        DingBridgeError::Database("foreign key constraint violation".into())
                    }
                    _ => DingBridgeError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => {
                DingBridgeError::NotFound("no rows returned by query".into())
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                DingBridgeError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                DingBridgeError::Database(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => DingBridgeError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => DingBridgeError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_dingbridge())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → DingBridgeError */
/* -------------------------------------------------------------------------- */

impl IntoDingBridgeError for r2d2::Error {
    fn into_dingbridge(self) -> DingBridgeError {
        DingBridgeError::Database(format!("connection pool: {self}"))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(value.into_dingbridge())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → DingBridgeError */
/* -------------------------------------------------------------------------- */

impl IntoDingBridgeError for HttpError {
    fn into_dingbridge(self) -> DingBridgeError {
        // Query strings may carry credentials (gettoken), so the URL never
        // reaches the message.
        let err = self.without_url();

        if err.is_timeout() {
            return DingBridgeError::Remote("HTTP request timed out".into());
        }

        if err.is_connect() {
            return DingBridgeError::Remote("HTTP connection failure".into());
        }

        if let Some(status) = err.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => DingBridgeError::Auth(message),
                _ => DingBridgeError::Remote(message),
            };
        }

        if err.is_builder() {
            return DingBridgeError::Internal(format!("invalid HTTP request: {err}"));
        }

        DingBridgeError::Remote(err.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_dingbridge())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
