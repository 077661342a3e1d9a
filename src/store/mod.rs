//! Persistence ports consumed by the lifecycle engine.
//!
//! The content store holds achievement documents, the workflow store holds
//! reference rows and their history, and the directory resolves principals to
//! student/lecturer profiles. None of them knows about the other; cross-store
//! consistency is the engine's job.

pub mod memory;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::lifecycle::{
    AchievementContent, AchievementReference, ContentId, LecturerId, NewContent, ReferenceId,
    Status, StatusHistoryEntry, StudentId, UserId,
};

pub use memory::{MemoryContentStore, MemoryDirectory, MemoryReconciliationQueue, MemoryWorkflowStore};

/// Document store for achievement content. Owns no workflow knowledge.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Insert a new document; the store assigns its id and timestamps.
    async fn insert(&self, content: NewContent) -> Result<AchievementContent, StoreError>;

    /// Soft-deleted documents are reported as absent.
    async fn find(&self, id: &ContentId) -> Result<Option<AchievementContent>, StoreError>;

    /// Fetch several documents; ids that do not resolve are skipped.
    async fn find_many(&self, ids: &[ContentId]) -> Result<Vec<AchievementContent>, StoreError>;

    /// Replace a document's fields and bump `updated_at`.
    async fn update(&self, content: AchievementContent) -> Result<AchievementContent, StoreError>;

    /// Soft-delete. Deleting an already-deleted document is not an error.
    async fn delete(&self, id: &ContentId) -> Result<(), StoreError>;
}

/// Filter for listing reference rows. Results are newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceQuery {
    /// `None` means every owner.
    pub owners: Option<Vec<StudentId>>,
    pub status: Option<Status>,
    pub offset: usize,
    /// `None` returns every match after `offset`.
    pub limit: Option<usize>,
}

/// Relational store for reference rows and their append-only history.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Fails with `Duplicate` if the id or the content id is already taken.
    async fn insert_reference(&self, reference: AchievementReference) -> Result<(), StoreError>;

    async fn find_reference(
        &self,
        id: &ReferenceId,
    ) -> Result<Option<AchievementReference>, StoreError>;

    /// Replace the row only if its status is still `expected`.
    ///
    /// Fails with `Conflict { actual }` when another writer got there first and
    /// `Missing` when the row is gone.
    async fn compare_and_swap(
        &self,
        expected: Status,
        reference: AchievementReference,
    ) -> Result<AchievementReference, StoreError>;

    /// Delete the row only if its status is still `expected`.
    async fn delete_reference(&self, id: &ReferenceId, expected: Status) -> Result<(), StoreError>;

    /// Idempotent on the entry id, so a retried append never duplicates.
    async fn append_history(&self, entry: StatusHistoryEntry) -> Result<(), StoreError>;

    /// History for one reference ordered by timestamp, oldest first.
    async fn history(&self, id: &ReferenceId) -> Result<Vec<StatusHistoryEntry>, StoreError>;

    /// Matching rows for the page plus the total match count.
    async fn list_references(
        &self,
        query: &ReferenceQuery,
    ) -> Result<(Vec<AchievementReference>, usize), StoreError>;

    async fn count_by_status(
        &self,
        owners: Option<&[StudentId]>,
    ) -> Result<BTreeMap<Status, usize>, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub user_id: UserId,
    pub full_name: String,
    pub advisor_id: Option<LecturerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecturer {
    pub id: LecturerId,
    pub user_id: UserId,
    pub full_name: String,
}

/// Student/lecturer profile lookups owned by the account service.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn student_by_user(&self, user_id: &UserId) -> Result<Option<Student>, StoreError>;

    async fn student_by_id(&self, id: &StudentId) -> Result<Option<Student>, StoreError>;

    async fn lecturer_by_user(&self, user_id: &UserId) -> Result<Option<Lecturer>, StoreError>;

    async fn advisees(&self, lecturer: &LecturerId) -> Result<Vec<Student>, StoreError>;
}

/// Content left without a reference, waiting for an offline sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanContent {
    pub content_id: ContentId,
    pub owner_id: StudentId,
    pub reason: String,
    pub flagged_at: DateTime<Utc>,
}

/// Sink for orphaned content. Nothing here is retried automatically.
#[async_trait]
pub trait ReconciliationQueue: Send + Sync {
    async fn flag_orphan(&self, orphan: OrphanContent) -> Result<(), StoreError>;
}
