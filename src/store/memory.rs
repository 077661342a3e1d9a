//! In-memory store adapters.
//!
//! Used by the demo and by tests. Each adapter can be told to fail its next
//! N calls of a given operation, which is how compensation and retry paths
//! are exercised without a real database.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{
    ContentStore, Directory, Lecturer, OrphanContent, ReconciliationQueue, ReferenceQuery,
    Student, WorkflowStore,
};
use crate::error::StoreError;
use crate::lifecycle::{
    AchievementContent, AchievementReference, ContentId, LecturerId, NewContent, ReferenceId,
    Status, StatusHistoryEntry, StudentId, UserId,
};

fn guard<T>(lock: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    lock.lock()
        .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".into()))
}

/// Armed failures per operation.
#[derive(Debug)]
struct Faults<Op> {
    pending: Mutex<HashMap<Op, u32>>,
}

impl<Op: Eq + Hash + Copy + std::fmt::Debug> Faults<Op> {
    fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    fn arm(&self, op: Op, times: u32) {
        if let Ok(mut pending) = self.pending.lock() {
            *pending.entry(op).or_insert(0) += times;
        }
    }

    /// Consume one armed failure for `op`, if any.
    fn trip(&self, op: Op) -> Result<(), StoreError> {
        let mut pending = guard(&self.pending)?;
        match pending.get_mut(&op) {
            Some(left) if *left > 0 => {
                *left -= 1;
                Err(StoreError::Unavailable(format!("injected failure on {op:?}")))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentOp {
    Insert,
    Find,
    Update,
    Delete,
}

#[derive(Debug)]
struct StoredContent {
    content: AchievementContent,
    deleted: bool,
}

/// Document store stand-in keyed by generated hex ids.
#[derive(Debug)]
pub struct MemoryContentStore {
    docs: Mutex<HashMap<ContentId, StoredContent>>,
    faults: Faults<ContentOp>,
    latency: Mutex<Option<Duration>>,
}

impl Default for MemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self {
            docs: Mutex::new(HashMap::new()),
            faults: Faults::new(),
            latency: Mutex::new(None),
        }
    }

    /// Make the next `times` calls of `op` fail with `Unavailable`.
    pub fn fail_next(&self, op: ContentOp, times: u32) {
        self.faults.arm(op, times);
    }

    /// Delay every call by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        if let Ok(mut slot) = self.latency.lock() {
            *slot = latency;
        }
    }

    /// Live (not soft-deleted) document count.
    pub fn live_count(&self) -> usize {
        self.docs
            .lock()
            .map(|docs| docs.values().filter(|d| !d.deleted).count())
            .unwrap_or(0)
    }

    async fn enter(&self, op: ContentOp) -> Result<(), StoreError> {
        let latency = *guard(&self.latency)?;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.faults.trip(op)
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn insert(&self, content: NewContent) -> Result<AchievementContent, StoreError> {
        self.enter(ContentOp::Insert).await?;
        let now = Utc::now();
        let stored = AchievementContent {
            id: ContentId::new(Uuid::new_v4().simple().to_string()),
            owner_id: content.owner_id,
            achievement_type: content.achievement_type,
            title: content.title,
            description: content.description,
            details: content.details,
            tags: content.tags,
            attachments: content.attachments,
            points: content.points,
            created_at: now,
            updated_at: now,
        };
        guard(&self.docs)?.insert(
            stored.id.clone(),
            StoredContent {
                content: stored.clone(),
                deleted: false,
            },
        );
        Ok(stored)
    }

    async fn find(&self, id: &ContentId) -> Result<Option<AchievementContent>, StoreError> {
        self.enter(ContentOp::Find).await?;
        Ok(guard(&self.docs)?
            .get(id)
            .filter(|d| !d.deleted)
            .map(|d| d.content.clone()))
    }

    async fn find_many(&self, ids: &[ContentId]) -> Result<Vec<AchievementContent>, StoreError> {
        self.enter(ContentOp::Find).await?;
        let docs = guard(&self.docs)?;
        Ok(ids
            .iter()
            .filter_map(|id| docs.get(id))
            .filter(|d| !d.deleted)
            .map(|d| d.content.clone())
            .collect())
    }

    async fn update(&self, content: AchievementContent) -> Result<AchievementContent, StoreError> {
        self.enter(ContentOp::Update).await?;
        let mut docs = guard(&self.docs)?;
        let slot = docs
            .get_mut(&content.id)
            .filter(|d| !d.deleted)
            .ok_or_else(|| StoreError::Missing(format!("content {}", content.id)))?;
        let mut updated = content;
        updated.created_at = slot.content.created_at;
        updated.updated_at = Utc::now();
        slot.content = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: &ContentId) -> Result<(), StoreError> {
        self.enter(ContentOp::Delete).await?;
        if let Some(doc) = guard(&self.docs)?.get_mut(id) {
            doc.deleted = true;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowOp {
    InsertReference,
    FindReference,
    CompareAndSwap,
    DeleteReference,
    AppendHistory,
    History,
    List,
    Count,
}

/// Relational store stand-in with unique-key and conditional-update semantics.
#[derive(Debug)]
pub struct MemoryWorkflowStore {
    rows: Mutex<HashMap<ReferenceId, AchievementReference>>,
    history: Mutex<Vec<StatusHistoryEntry>>,
    faults: Faults<WorkflowOp>,
}

impl Default for MemoryWorkflowStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryWorkflowStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            history: Mutex::new(Vec::new()),
            faults: Faults::new(),
        }
    }

    pub fn fail_next(&self, op: WorkflowOp, times: u32) {
        self.faults.arm(op, times);
    }

    pub fn reference_count(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }
}

#[async_trait]
impl WorkflowStore for MemoryWorkflowStore {
    async fn insert_reference(&self, reference: AchievementReference) -> Result<(), StoreError> {
        self.faults.trip(WorkflowOp::InsertReference)?;
        let mut rows = guard(&self.rows)?;
        if rows.contains_key(&reference.id) {
            return Err(StoreError::Duplicate(format!("reference {}", reference.id)));
        }
        if rows.values().any(|r| r.content_id == reference.content_id) {
            return Err(StoreError::Duplicate(format!(
                "content {} already referenced",
                reference.content_id
            )));
        }
        rows.insert(reference.id, reference);
        Ok(())
    }

    async fn find_reference(
        &self,
        id: &ReferenceId,
    ) -> Result<Option<AchievementReference>, StoreError> {
        self.faults.trip(WorkflowOp::FindReference)?;
        Ok(guard(&self.rows)?.get(id).cloned())
    }

    async fn compare_and_swap(
        &self,
        expected: Status,
        reference: AchievementReference,
    ) -> Result<AchievementReference, StoreError> {
        self.faults.trip(WorkflowOp::CompareAndSwap)?;
        let mut rows = guard(&self.rows)?;
        let row = rows
            .get_mut(&reference.id)
            .ok_or_else(|| StoreError::Missing(format!("reference {}", reference.id)))?;
        if row.status != expected {
            return Err(StoreError::Conflict { actual: row.status });
        }
        *row = reference.clone();
        Ok(reference)
    }

    async fn delete_reference(&self, id: &ReferenceId, expected: Status) -> Result<(), StoreError> {
        self.faults.trip(WorkflowOp::DeleteReference)?;
        let mut rows = guard(&self.rows)?;
        let actual = rows
            .get(id)
            .map(|r| r.status)
            .ok_or_else(|| StoreError::Missing(format!("reference {id}")))?;
        if actual != expected {
            return Err(StoreError::Conflict { actual });
        }
        rows.remove(id);
        Ok(())
    }

    async fn append_history(&self, entry: StatusHistoryEntry) -> Result<(), StoreError> {
        self.faults.trip(WorkflowOp::AppendHistory)?;
        let mut history = guard(&self.history)?;
        if !history.iter().any(|e| e.id == entry.id) {
            history.push(entry);
        }
        Ok(())
    }

    async fn history(&self, id: &ReferenceId) -> Result<Vec<StatusHistoryEntry>, StoreError> {
        self.faults.trip(WorkflowOp::History)?;
        let mut entries: Vec<StatusHistoryEntry> = guard(&self.history)?
            .iter()
            .filter(|e| e.reference_id == *id)
            .cloned()
            .collect();
        // Stable: equal timestamps keep insertion order.
        entries.sort_by_key(|e| e.timestamp);
        Ok(entries)
    }

    async fn list_references(
        &self,
        query: &ReferenceQuery,
    ) -> Result<(Vec<AchievementReference>, usize), StoreError> {
        self.faults.trip(WorkflowOp::List)?;
        let owners: Option<HashSet<StudentId>> =
            query.owners.as_ref().map(|o| o.iter().copied().collect());
        let mut matches: Vec<AchievementReference> = guard(&self.rows)?
            .values()
            .filter(|r| owners.as_ref().is_none_or(|o| o.contains(&r.owner_id)))
            .filter(|r| query.status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matches.len();
        let page = matches
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();
        Ok((page, total))
    }

    async fn count_by_status(
        &self,
        owners: Option<&[StudentId]>,
    ) -> Result<BTreeMap<Status, usize>, StoreError> {
        self.faults.trip(WorkflowOp::Count)?;
        let mut counts = BTreeMap::new();
        for row in guard(&self.rows)?.values() {
            if owners.is_none_or(|o| o.contains(&row.owner_id)) {
                *counts.entry(row.status).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

/// Directory stand-in seeded by the caller.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    students: Mutex<Vec<Student>>,
    lecturers: Mutex<Vec<Lecturer>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a student account and return its profile.
    pub fn add_student(&self, full_name: &str, advisor: Option<LecturerId>) -> Student {
        let student = Student {
            id: StudentId::new(),
            user_id: UserId::new(),
            full_name: full_name.to_string(),
            advisor_id: advisor,
        };
        if let Ok(mut students) = self.students.lock() {
            students.push(student.clone());
        }
        student
    }

    pub fn add_lecturer(&self, full_name: &str) -> Lecturer {
        let lecturer = Lecturer {
            id: LecturerId::new(),
            user_id: UserId::new(),
            full_name: full_name.to_string(),
        };
        if let Ok(mut lecturers) = self.lecturers.lock() {
            lecturers.push(lecturer.clone());
        }
        lecturer
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn student_by_user(&self, user_id: &UserId) -> Result<Option<Student>, StoreError> {
        Ok(guard(&self.students)?
            .iter()
            .find(|s| s.user_id == *user_id)
            .cloned())
    }

    async fn student_by_id(&self, id: &StudentId) -> Result<Option<Student>, StoreError> {
        Ok(guard(&self.students)?.iter().find(|s| s.id == *id).cloned())
    }

    async fn lecturer_by_user(&self, user_id: &UserId) -> Result<Option<Lecturer>, StoreError> {
        Ok(guard(&self.lecturers)?
            .iter()
            .find(|l| l.user_id == *user_id)
            .cloned())
    }

    async fn advisees(&self, lecturer: &LecturerId) -> Result<Vec<Student>, StoreError> {
        Ok(guard(&self.students)?
            .iter()
            .filter(|s| s.advisor_id.as_ref() == Some(lecturer))
            .cloned()
            .collect())
    }
}

/// Collects flagged orphans for inspection.
#[derive(Debug, Default)]
pub struct MemoryReconciliationQueue {
    orphans: Mutex<Vec<OrphanContent>>,
}

impl MemoryReconciliationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orphans(&self) -> Vec<OrphanContent> {
        self.orphans.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ReconciliationQueue for MemoryReconciliationQueue {
    async fn flag_orphan(&self, orphan: OrphanContent) -> Result<(), StoreError> {
        guard(&self.orphans)?.push(orphan);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{AchievementType, Details};
    use std::collections::BTreeSet;

    fn new_content(owner: StudentId) -> NewContent {
        NewContent {
            owner_id: owner,
            achievement_type: AchievementType::Academic,
            title: "Dean's list".into(),
            description: String::new(),
            details: Details::new(),
            tags: BTreeSet::new(),
            attachments: Vec::new(),
            points: 70,
        }
    }

    #[tokio::test]
    async fn soft_deleted_content_is_invisible() {
        let store = MemoryContentStore::new();
        let doc = store.insert(new_content(StudentId::new())).await.unwrap();
        assert_eq!(store.live_count(), 1);

        store.delete(&doc.id).await.unwrap();
        assert_eq!(store.find(&doc.id).await.unwrap(), None);
        assert!(store.find_many(&[doc.id.clone()]).await.unwrap().is_empty());
        assert!(matches!(store.update(doc).await, Err(StoreError::Missing(_))));
        assert_eq!(store.live_count(), 0);
    }

    #[tokio::test]
    async fn injected_faults_are_consumed() {
        let store = MemoryContentStore::new();
        store.fail_next(ContentOp::Insert, 1);
        assert!(store.insert(new_content(StudentId::new())).await.is_err());
        assert!(store.insert(new_content(StudentId::new())).await.is_ok());
    }

    #[tokio::test]
    async fn compare_and_swap_refuses_stale_status() {
        let content = MemoryContentStore::new();
        let workflow = MemoryWorkflowStore::new();
        let doc = content.insert(new_content(StudentId::new())).await.unwrap();
        let reference = AchievementReference::draft_for(&doc);
        workflow.insert_reference(reference.clone()).await.unwrap();

        let submitted = reference.moved_to(Status::Submitted, UserId::new(), None);
        workflow
            .compare_and_swap(Status::Draft, submitted.clone())
            .await
            .unwrap();

        let second = workflow.compare_and_swap(Status::Draft, submitted).await;
        assert_eq!(second, Err(StoreError::Conflict { actual: Status::Submitted }));

        let deleted = workflow.delete_reference(&reference.id, Status::Draft).await;
        assert_eq!(deleted, Err(StoreError::Conflict { actual: Status::Submitted }));
    }

    #[tokio::test]
    async fn one_reference_per_content() {
        let content = MemoryContentStore::new();
        let workflow = MemoryWorkflowStore::new();
        let doc = content.insert(new_content(StudentId::new())).await.unwrap();
        workflow
            .insert_reference(AchievementReference::draft_for(&doc))
            .await
            .unwrap();
        let again = workflow
            .insert_reference(AchievementReference::draft_for(&doc))
            .await;
        assert!(matches!(again, Err(StoreError::Duplicate(_))));
    }

    #[tokio::test]
    async fn list_filters_owner_and_status_and_pages() {
        let content = MemoryContentStore::new();
        let workflow = MemoryWorkflowStore::new();
        let alice = StudentId::new();
        let bob = StudentId::new();
        for owner in [alice, alice, alice, bob] {
            let doc = content.insert(new_content(owner)).await.unwrap();
            workflow
                .insert_reference(AchievementReference::draft_for(&doc))
                .await
                .unwrap();
        }

        let query = ReferenceQuery {
            owners: Some(vec![alice]),
            status: Some(Status::Draft),
            offset: 1,
            limit: Some(1),
        };
        let (page, total) = workflow.list_references(&query).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].owner_id, alice);

        let counts = workflow.count_by_status(Some(&[bob])).await.unwrap();
        assert_eq!(counts.get(&Status::Draft), Some(&1));
        let all = workflow.count_by_status(None).await.unwrap();
        assert_eq!(all.get(&Status::Draft), Some(&4));
    }

    #[tokio::test]
    async fn directory_resolves_advisees() {
        let directory = MemoryDirectory::new();
        let lecturer = directory.add_lecturer("Dr. Sari");
        let advisee = directory.add_student("Budi", Some(lecturer.id));
        directory.add_student("Citra", None);

        let found = directory.advisees(&lecturer.id).await.unwrap();
        assert_eq!(found, vec![advisee.clone()]);
        assert_eq!(
            directory.student_by_user(&advisee.user_id).await.unwrap(),
            Some(advisee)
        );
        assert!(directory.lecturer_by_user(&UserId::new()).await.unwrap().is_none());
    }
}
