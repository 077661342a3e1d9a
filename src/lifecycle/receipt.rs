use serde::{Deserialize, Serialize};

use super::achievement::ReferenceId;
use super::state::Status;

/// Something that went wrong after the operation's commit point.
///
/// The operation itself succeeded; the caller should surface these as a
/// partial-success notice rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// The status changed but its audit entry could not be written.
    HistoryNotRecorded {
        reference_id: ReferenceId,
        from: Option<Status>,
        to: Status,
        reason: String,
    },
}

/// Result of a mutating operation plus any post-commit warnings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Receipt<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(value: T, warnings: Vec<Warning>) -> Self {
        Self { value, warnings }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Receipt<U> {
        Receipt {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}
