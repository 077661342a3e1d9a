use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lifecycle::{Action, ContentId, IllegalTransition, Status};

/// Everything the lifecycle engine can hand back to its caller.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("not authorized: {0}")]
    Authorization(String),

    #[error("cannot {action} a {current} achievement")]
    InvalidTransition { current: Status, action: Action },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("stores out of sync: {message}")]
    Consistency {
        message: String,
        /// Content left behind without a reference, if any.
        orphan: Option<ContentId>,
    },

    #[error("storage unavailable: {0}")]
    Storage(String),
}

impl LifecycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LifecycleError::Validation(_) => ErrorKind::Validation,
            LifecycleError::Authorization(_) => ErrorKind::Authorization,
            LifecycleError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            LifecycleError::NotFound(_) => ErrorKind::NotFound,
            LifecycleError::Consistency { .. } => ErrorKind::Consistency,
            LifecycleError::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl From<IllegalTransition> for LifecycleError {
    fn from(err: IllegalTransition) -> Self {
        LifecycleError::InvalidTransition {
            current: err.current,
            action: err.action,
        }
    }
}

impl From<StoreError> for LifecycleError {
    /// Collapses adapter failures into a generic storage error. Callers that
    /// care about `Conflict` or `Missing` match on the store error first.
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout => LifecycleError::Storage("request deadline exceeded".into()),
            StoreError::Conflict { actual } => {
                LifecycleError::Storage(format!("concurrent update left the row {actual}"))
            }
            StoreError::Duplicate(_) => LifecycleError::Storage("duplicate record".into()),
            StoreError::Missing(_) => LifecycleError::Storage("record vanished mid-request".into()),
            StoreError::Unavailable(_) => LifecycleError::Storage("store unavailable".into()),
        }
    }
}

/// Stable machine-readable error code for the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Authorization,
    InvalidTransition,
    NotFound,
    Consistency,
    Storage,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Authorization => "authorization",
            ErrorKind::InvalidTransition => "invalid_transition",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Consistency => "consistency",
            ErrorKind::Storage => "storage",
        };
        f.write_str(code)
    }
}

/// Failures reported by store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing store could not serve the call (connection, driver, I/O).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("request deadline exceeded")]
    Timeout,

    /// A conditional write found the row in a different status.
    #[error("status precondition failed, row is {actual}")]
    Conflict { actual: Status },

    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("no such record: {0}")]
    Missing(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_display() {
        let err = LifecycleError::InvalidTransition {
            current: Status::Submitted,
            action: Action::Delete,
        };
        assert_eq!(err.to_string(), "cannot delete a submitted achievement");
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    }

    #[test]
    fn store_errors_do_not_leak_driver_detail() {
        let err: LifecycleError =
            StoreError::Unavailable("pq: connection refused at 10.0.0.4:5432".into()).into();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(!err.to_string().contains("10.0.0.4"));
    }

    #[test]
    fn error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::InvalidTransition).unwrap();
        assert_eq!(json, "\"invalid_transition\"");
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LifecycleError>();
        assert_send_sync::<StoreError>();
    }
}
