use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::achievement::UserId;
use crate::error::StoreError;

/// Capability tier of an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Owns achievements; sees only their own.
    Student,
    /// Verifies advisees' achievements; sees advisees only.
    Advisor,
    /// Sees everything, verifies nothing it does not advise.
    Admin,
}

/// An already-authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Per-request state: who is calling and by when the work must be done.
///
/// The deadline bounds every store call made on behalf of the request.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    pub principal: Principal,
    deadline: Instant,
}

impl RequestContext {
    pub fn new(principal: Principal, timeout: Duration) -> Self {
        Self::with_deadline(principal, Instant::now() + timeout)
    }

    pub fn with_deadline(principal: Principal, deadline: Instant) -> Self {
        Self {
            principal,
            deadline,
        }
    }

    pub fn actor(&self) -> UserId {
        self.principal.user_id
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Run a store call, failing with [`StoreError::Timeout`] past the deadline.
    pub async fn bounded<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        tokio::time::timeout_at(self.deadline, call)
            .await
            .unwrap_or(Err(StoreError::Timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(timeout: Duration) -> RequestContext {
        RequestContext::new(Principal::new(UserId::new(), Role::Student), timeout)
    }

    #[tokio::test]
    async fn bounded_passes_through_fast_calls() {
        let result = ctx(Duration::from_secs(5))
            .bounded(async { Ok::<_, StoreError>(7) })
            .await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn bounded_times_out_slow_calls() {
        let result = ctx(Duration::from_millis(10))
            .bounded(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, StoreError>(())
            })
            .await;
        assert_eq!(result, Err(StoreError::Timeout));
    }

    #[test]
    fn role_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Advisor).unwrap(), "\"advisor\"");
    }
}
