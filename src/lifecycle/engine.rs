use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::achievement::{
    AchievementContent, AchievementPatch, AchievementReference, AchievementType, AchievementView,
    ContentId, CreateAchievementRequest, NewContent, ReferenceId, StatusHistoryEntry, StudentId,
};
use super::context::{RequestContext, Role};
use super::receipt::{Receipt, Warning};
use super::state::{Action, Actor, StateMachine, Status, Transition};
use crate::authz::{self, Relationship};
use crate::config::LaurelConfig;
use crate::error::{LifecycleError, StoreError};
use crate::scoring::Scorer;
use crate::stats::{Statistics, StatisticsBuilder, StatisticsQuery};
use crate::store::{
    ContentStore, Directory, OrphanContent, ReconciliationQueue, ReferenceQuery, WorkflowStore,
};

/// The four collaborators the engine orchestrates.
#[derive(Clone)]
pub struct Stores {
    pub content: Arc<dyn ContentStore>,
    pub workflow: Arc<dyn WorkflowStore>,
    pub directory: Arc<dyn Directory>,
    pub reconciliation: Arc<dyn ReconciliationQueue>,
}

/// Listing filter. `page` is 1-based; `limit` 0 means the configured default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilter {
    pub status: Option<Status>,
    pub achievement_type: Option<AchievementType>,
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

/// Drives achievements through their lifecycle across both stores.
///
/// The only component allowed to change a reference's status. Every mutating
/// call checks authorization, then the transition table, then writes with a
/// status precondition so concurrent callers cannot both win.
pub struct LifecycleEngine {
    stores: Stores,
    config: LaurelConfig,
}

impl LifecycleEngine {
    pub fn new(stores: Stores, config: LaurelConfig) -> Self {
        Self { stores, config }
    }

    /// Create content and its `draft` reference.
    ///
    /// Content is written first and the reference second; the reference write
    /// is the commit point. If it fails the content is deleted again, and if
    /// that also fails the content is flagged as an orphan.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        request: CreateAchievementRequest,
    ) -> Result<Receipt<AchievementView>, LifecycleError> {
        let owner = ctx
            .bounded(self.stores.directory.student_by_user(&ctx.actor()))
            .await?
            .ok_or_else(|| {
                LifecycleError::Authorization("only students can report achievements".into())
            })?;

        let achievement_type: AchievementType = request
            .achievement_type
            .parse()
            .map_err(LifecycleError::Validation)?;
        let title = request.title.trim();
        if title.is_empty() {
            return Err(LifecycleError::Validation("title must not be empty".into()));
        }

        let new_content = NewContent {
            owner_id: owner.id,
            achievement_type,
            title: title.to_string(),
            description: request.description,
            points: Scorer::points(achievement_type, &request.details),
            details: request.details,
            tags: request.tags,
            attachments: Vec::new(),
        };

        let content = ctx
            .bounded(self.stores.content.insert(new_content))
            .await
            .inspect_err(|e| warn!(owner_id = %owner.id, error = %e, "content insert failed"))?;

        let reference = AchievementReference::draft_for(&content);
        if let Err(cause) = ctx
            .bounded(self.stores.workflow.insert_reference(reference.clone()))
            .await
        {
            return Err(self.compensate_create(ctx, &content, cause).await);
        }

        info!(
            reference_id = %reference.id,
            content_id = %content.id,
            points = content.points,
            "achievement created"
        );

        let entry = StatusHistoryEntry::record(
            reference.id,
            None,
            Status::Draft,
            ctx.actor(),
            Some("created".into()),
        );
        let warnings = self.record_history(ctx, entry).await.into_iter().collect();

        let view = AchievementView::merge(&reference, content).with_student_name(Some(owner.full_name));
        Ok(Receipt::with_warnings(view, warnings))
    }

    /// Undo a content insert whose reference never landed.
    async fn compensate_create(
        &self,
        ctx: &RequestContext,
        content: &AchievementContent,
        cause: StoreError,
    ) -> LifecycleError {
        error!(
            content_id = %content.id,
            error = %cause,
            "reference insert failed after content insert, rolling back content"
        );

        // The caller's deadline may be what failed the reference write.
        let repair = RequestContext::new(ctx.principal, self.config.request_timeout());
        match repair.bounded(self.stores.content.delete(&content.id)).await {
            Ok(()) => LifecycleError::Consistency {
                message: "achievement could not be recorded; content was rolled back".into(),
                orphan: None,
            },
            Err(rollback) => {
                error!(
                    content_id = %content.id,
                    error = %rollback,
                    "content rollback failed, flagging orphan"
                );
                self.flag_orphan(&repair, content.id.clone(), content.owner_id, "creation rollback failed")
                    .await;
                LifecycleError::Consistency {
                    message: "achievement could not be recorded; content left for reconciliation"
                        .into(),
                    orphan: Some(content.id.clone()),
                }
            }
        }
    }

    async fn flag_orphan(
        &self,
        ctx: &RequestContext,
        content_id: ContentId,
        owner_id: StudentId,
        reason: &str,
    ) {
        let orphan = OrphanContent {
            content_id: content_id.clone(),
            owner_id,
            reason: reason.to_string(),
            flagged_at: Utc::now(),
        };
        if let Err(e) = ctx
            .bounded(self.stores.reconciliation.flag_orphan(orphan))
            .await
        {
            error!(
                content_id = %content_id,
                error = %e,
                reason,
                "could not queue orphaned content for reconciliation"
            );
        }
    }

    pub async fn get(
        &self,
        ctx: &RequestContext,
        id: &ReferenceId,
    ) -> Result<AchievementView, LifecycleError> {
        let reference = self.load_reference(ctx, id).await?;
        let content = self.load_content(ctx, &reference).await?;
        let name = self.student_name(ctx, &reference.owner_id).await;
        Ok(AchievementView::merge(&reference, content).with_student_name(name))
    }

    /// Apply an owner's edit. Points are recomputed from the edited content.
    ///
    /// Content is written first and the status second. Editing a `rejected`
    /// achievement then moves it back to `draft`; editing a `draft` re-asserts
    /// `draft`. If that status write loses to another writer, the previous
    /// content is written back. A concurrent reader can still observe the
    /// edited content for the duration of that window.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: &ReferenceId,
        patch: AchievementPatch,
    ) -> Result<Receipt<AchievementView>, LifecycleError> {
        validate_patch(&patch)?;

        let reference = self.load_reference(ctx, id).await?;
        self.authorize(ctx, Action::Edit, &reference).await?;

        let transition = StateMachine::next(reference.status, Action::Edit)?;
        if transition == Transition::Remove {
            return unreachable_transition(reference.status, Action::Edit);
        }

        let original = self.load_content(ctx, &reference).await?;
        let mut edited = original.clone();
        patch.apply_to(&mut edited);
        edited.points = Scorer::points(edited.achievement_type, &edited.details);

        let content = match ctx.bounded(self.stores.content.update(edited)).await {
            Ok(content) => content,
            Err(StoreError::Missing(_)) => {
                error!(reference_id = %reference.id, "content vanished during edit");
                return Err(not_found(id));
            }
            Err(e) => return Err(e.into()),
        };

        let committed = match transition {
            Transition::Move { from, to } => self
                .apply_move(ctx, &reference, Action::Edit, from, to, Some("edited after rejection"))
                .await
                .map(|(moved, warning)| (moved, warning.into_iter().collect::<Vec<_>>())),
            Transition::Stay(status) => {
                let mut touched = reference.clone();
                touched.updated_at = Utc::now();
                self.swap(ctx, status, touched, Action::Edit)
                    .await
                    .map(|row| (row, Vec::new()))
            }
            Transition::Remove => unreachable_transition(reference.status, Action::Edit),
        };
        let (reference, warnings) = match committed {
            Ok(committed) => committed,
            Err(e) => {
                self.restore_content(ctx, original).await;
                return Err(e);
            }
        };

        info!(reference_id = %reference.id, points = content.points, "achievement edited");
        let name = self.student_name(ctx, &reference.owner_id).await;
        let view = AchievementView::merge(&reference, content).with_student_name(name);
        Ok(Receipt::with_warnings(view, warnings))
    }

    /// Put back the content an edit overwrote before its status write failed.
    async fn restore_content(&self, ctx: &RequestContext, original: AchievementContent) {
        let repair = RequestContext::new(ctx.principal, self.config.request_timeout());
        let content_id = original.id.clone();
        match repair.bounded(self.stores.content.update(original)).await {
            Ok(_) => warn!(content_id = %content_id, "edit abandoned, previous content restored"),
            Err(e) => error!(
                content_id = %content_id,
                error = %e,
                "edit abandoned but previous content could not be restored"
            ),
        }
    }

    /// Remove a `draft` achievement from both stores.
    ///
    /// The reference goes first so the achievement disappears atomically from
    /// the caller's point of view; leftover content is flagged, not retried.
    pub async fn delete(&self, ctx: &RequestContext, id: &ReferenceId) -> Result<(), LifecycleError> {
        let reference = self.load_reference(ctx, id).await?;
        self.authorize(ctx, Action::Delete, &reference).await?;
        StateMachine::next(reference.status, Action::Delete)?;

        match ctx
            .bounded(self.stores.workflow.delete_reference(id, Status::Draft))
            .await
        {
            Ok(()) => {}
            Err(StoreError::Conflict { actual }) => {
                return Err(LifecycleError::InvalidTransition {
                    current: actual,
                    action: Action::Delete,
                });
            }
            Err(StoreError::Missing(_)) => return Err(not_found(id)),
            Err(e) => return Err(e.into()),
        }

        if let Err(e) = ctx
            .bounded(self.stores.content.delete(&reference.content_id))
            .await
        {
            error!(
                reference_id = %id,
                content_id = %reference.content_id,
                error = %e,
                "reference deleted but content delete failed"
            );
            let repair = RequestContext::new(ctx.principal, self.config.request_timeout());
            self.flag_orphan(
                &repair,
                reference.content_id.clone(),
                reference.owner_id,
                "deletion left content behind",
            )
            .await;
            return Err(LifecycleError::Consistency {
                message: "achievement deleted but its content is awaiting reconciliation".into(),
                orphan: Some(reference.content_id),
            });
        }

        info!(reference_id = %id, content_id = %reference.content_id, "achievement deleted");
        Ok(())
    }

    pub async fn submit(
        &self,
        ctx: &RequestContext,
        id: &ReferenceId,
        note: Option<String>,
    ) -> Result<Receipt<AchievementReference>, LifecycleError> {
        self.transition(ctx, id, Action::Submit, note).await
    }

    pub async fn verify(
        &self,
        ctx: &RequestContext,
        id: &ReferenceId,
        note: Option<String>,
    ) -> Result<Receipt<AchievementReference>, LifecycleError> {
        self.transition(ctx, id, Action::Verify, note).await
    }

    /// Reject a submission. The note is mandatory and becomes the rejection note.
    pub async fn reject(
        &self,
        ctx: &RequestContext,
        id: &ReferenceId,
        note: &str,
    ) -> Result<Receipt<AchievementReference>, LifecycleError> {
        let note = note.trim();
        if note.is_empty() {
            return Err(LifecycleError::Validation(
                "a rejection note is required".into(),
            ));
        }
        self.transition(ctx, id, Action::Reject, Some(note.to_string()))
            .await
    }

    async fn transition(
        &self,
        ctx: &RequestContext,
        id: &ReferenceId,
        action: Action,
        note: Option<String>,
    ) -> Result<Receipt<AchievementReference>, LifecycleError> {
        let reference = self.load_reference(ctx, id).await?;
        self.authorize(ctx, action, &reference).await?;

        match StateMachine::next(reference.status, action)? {
            Transition::Move { from, to } => {
                let (moved, warning) = self
                    .apply_move(ctx, &reference, action, from, to, note.as_deref())
                    .await?;
                Ok(Receipt::with_warnings(moved, warning.into_iter().collect()))
            }
            Transition::Stay(_) | Transition::Remove => unreachable_transition(reference.status, action),
        }
    }

    /// Conditionally write `from → to` and record it in history.
    async fn apply_move(
        &self,
        ctx: &RequestContext,
        reference: &AchievementReference,
        action: Action,
        from: Status,
        to: Status,
        note: Option<&str>,
    ) -> Result<(AchievementReference, Option<Warning>), LifecycleError> {
        let next = reference.moved_to(to, ctx.actor(), note);
        let moved = self.swap(ctx, from, next, action).await?;

        info!(
            reference_id = %moved.id,
            %action,
            %from,
            %to,
            actor = %ctx.actor(),
            "status changed"
        );

        let entry = StatusHistoryEntry::record(
            moved.id,
            Some(from),
            to,
            ctx.actor(),
            note.map(str::to_string),
        );
        let warning = self.record_history(ctx, entry).await;
        Ok((moved, warning))
    }

    async fn swap(
        &self,
        ctx: &RequestContext,
        expected: Status,
        next: AchievementReference,
        action: Action,
    ) -> Result<AchievementReference, LifecycleError> {
        let id = next.id;
        match ctx
            .bounded(self.stores.workflow.compare_and_swap(expected, next))
            .await
        {
            Ok(row) => Ok(row),
            Err(StoreError::Conflict { actual }) => {
                warn!(
                    reference_id = %id,
                    %action,
                    %expected,
                    %actual,
                    "lost a concurrent transition"
                );
                Err(LifecycleError::InvalidTransition {
                    current: actual,
                    action,
                })
            }
            Err(StoreError::Missing(_)) => Err(not_found(&id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Append a history entry, retrying with backoff. Never fails the caller:
    /// the status write already committed, so exhaustion becomes a warning.
    async fn record_history(
        &self,
        ctx: &RequestContext,
        entry: StatusHistoryEntry,
    ) -> Option<Warning> {
        let retry = &self.config.history_retry;
        let mut attempt = 0;
        loop {
            match ctx
                .bounded(self.stores.workflow.append_history(entry.clone()))
                .await
            {
                Ok(()) => return None,
                Err(e) if attempt < retry.max_retries && e != StoreError::Timeout => {
                    attempt += 1;
                    let delay = retry.delay_for_attempt(attempt);
                    warn!(
                        reference_id = %entry.reference_id,
                        attempt,
                        max_retries = retry.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "history append failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!(
                        reference_id = %entry.reference_id,
                        to = %entry.new_status,
                        attempts = attempt + 1,
                        error = %e,
                        "history entry lost"
                    );
                    return Some(Warning::HistoryNotRecorded {
                        reference_id: entry.reference_id,
                        from: entry.old_status,
                        to: entry.new_status,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    /// Status history, oldest first.
    pub async fn history(
        &self,
        ctx: &RequestContext,
        id: &ReferenceId,
    ) -> Result<Vec<StatusHistoryEntry>, LifecycleError> {
        self.load_reference(ctx, id).await?;
        Ok(ctx.bounded(self.stores.workflow.history(id)).await?)
    }

    /// Achievements visible to the caller: students see their own, advisors
    /// their advisees', admins everything.
    pub async fn list_for_role(
        &self,
        ctx: &RequestContext,
        filter: &ListFilter,
    ) -> Result<Page<AchievementView>, LifecycleError> {
        let limit = match filter.limit {
            0 => self.config.default_page_size,
            n => n.min(self.config.max_page_size),
        }
        .max(1);
        let page = filter.page.max(1);
        let offset = (page - 1).saturating_mul(limit);

        let owners = self.scope(ctx).await?;
        if owners.as_ref().is_some_and(Vec::is_empty) {
            return Ok(Page {
                items: Vec::new(),
                total: 0,
                page,
                limit,
            });
        }

        let Some(wanted) = filter.achievement_type else {
            let query = ReferenceQuery {
                owners,
                status: filter.status,
                offset,
                limit: Some(limit),
            };
            let (references, total) = ctx
                .bounded(self.stores.workflow.list_references(&query))
                .await?;
            let items = self.join(ctx, references).await?;
            return Ok(Page {
                items,
                total,
                page,
                limit,
            });
        };

        // Type lives in the content store, so filter after the join and page locally.
        let query = ReferenceQuery {
            owners,
            status: filter.status,
            offset: 0,
            limit: None,
        };
        let (references, _) = ctx
            .bounded(self.stores.workflow.list_references(&query))
            .await?;
        let matching: Vec<AchievementView> = self
            .join(ctx, references)
            .await?
            .into_iter()
            .filter(|view| view.achievement_type == wanted)
            .collect();
        let total = matching.len();
        let items = matching.into_iter().skip(offset).take(limit).collect();
        Ok(Page {
            items,
            total,
            page,
            limit,
        })
    }

    /// Owners visible to the caller; `None` means everyone.
    async fn scope(&self, ctx: &RequestContext) -> Result<Option<Vec<StudentId>>, LifecycleError> {
        let directory = &self.stores.directory;
        match ctx.principal.role {
            Role::Student => {
                let student = ctx
                    .bounded(directory.student_by_user(&ctx.actor()))
                    .await?
                    .ok_or_else(|| LifecycleError::Authorization("no student profile".into()))?;
                Ok(Some(vec![student.id]))
            }
            Role::Advisor => {
                let lecturer = ctx
                    .bounded(directory.lecturer_by_user(&ctx.actor()))
                    .await?
                    .ok_or_else(|| LifecycleError::Authorization("no lecturer profile".into()))?;
                let advisees = ctx.bounded(directory.advisees(&lecturer.id)).await?;
                Ok(Some(advisees.into_iter().map(|s| s.id).collect()))
            }
            Role::Admin => Ok(None),
        }
    }

    /// Merge references with their content, newest-first order preserved.
    async fn join(
        &self,
        ctx: &RequestContext,
        references: Vec<AchievementReference>,
    ) -> Result<Vec<AchievementView>, LifecycleError> {
        let ids: Vec<ContentId> = references.iter().map(|r| r.content_id.clone()).collect();
        let mut contents: HashMap<ContentId, AchievementContent> = ctx
            .bounded(self.stores.content.find_many(&ids))
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        let mut names: HashMap<StudentId, Option<String>> = HashMap::new();
        let mut views = Vec::with_capacity(references.len());
        for reference in references {
            let Some(content) = contents.remove(&reference.content_id) else {
                warn!(
                    reference_id = %reference.id,
                    content_id = %reference.content_id,
                    "reference has no content, skipping"
                );
                continue;
            };
            let name = match names.get(&reference.owner_id) {
                Some(name) => name.clone(),
                None => {
                    let name = self.student_name(ctx, &reference.owner_id).await;
                    names.insert(reference.owner_id, name.clone());
                    name
                }
            };
            views.push(AchievementView::merge(&reference, content).with_student_name(name));
        }
        Ok(views)
    }

    /// Best-effort aggregate report. Failing sub-queries degrade, never abort.
    pub async fn statistics(&self, ctx: &RequestContext, query: &StatisticsQuery) -> Statistics {
        let mut builder = StatisticsBuilder::new(self.config.top_students);
        let owners = query.owners.as_deref();

        match ctx
            .bounded(self.stores.workflow.count_by_status(owners))
            .await
        {
            Ok(mut counts) => {
                if let Some(status) = query.status {
                    counts.retain(|s, _| *s == status);
                }
                builder.status_counts(counts);
            }
            Err(e) => {
                warn!(error = %e, "status counts unavailable");
                builder.degrade();
            }
        }

        let reference_query = ReferenceQuery {
            owners: query.owners.clone(),
            status: query.status,
            offset: 0,
            limit: None,
        };
        match ctx
            .bounded(self.stores.workflow.list_references(&reference_query))
            .await
        {
            Ok((references, _)) => {
                let ids: Vec<ContentId> =
                    references.iter().map(|r| r.content_id.clone()).collect();
                match ctx.bounded(self.stores.content.find_many(&ids)).await {
                    Ok(contents) => {
                        builder
                            .contents(&contents)
                            .missing(ids.len().saturating_sub(contents.len()));
                    }
                    Err(e) => {
                        warn!(error = %e, "content unavailable for type breakdown");
                        builder.degrade();
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "references unavailable for type breakdown");
                builder.degrade();
            }
        }

        let mut stats = builder.build();
        for top in &mut stats.top_students {
            top.full_name = self.student_name(ctx, &top.owner_id).await;
        }
        stats
    }

    /// Statistics over whatever the caller is allowed to list.
    pub async fn statistics_for_role(
        &self,
        ctx: &RequestContext,
    ) -> Result<Statistics, LifecycleError> {
        let owners = self.scope(ctx).await?;
        let query = StatisticsQuery {
            owners,
            status: None,
        };
        Ok(self.statistics(ctx, &query).await)
    }

    /// Resolve the caller's relationship to `reference` and consult the gate.
    async fn authorize(
        &self,
        ctx: &RequestContext,
        action: Action,
        reference: &AchievementReference,
    ) -> Result<(), LifecycleError> {
        let directory = &self.stores.directory;
        let result = match action.required_actor() {
            Actor::Owner => {
                let actor = ctx.bounded(directory.student_by_user(&ctx.actor())).await?;
                authz::authorize(
                    action,
                    &Relationship {
                        actor_student: actor.as_ref().map(|s| &s.id),
                        owner: Some(&reference.owner_id),
                        ..Relationship::default()
                    },
                )
            }
            Actor::Advisor => {
                let actor = ctx.bounded(directory.lecturer_by_user(&ctx.actor())).await?;
                let owner = ctx
                    .bounded(directory.student_by_id(&reference.owner_id))
                    .await?;
                authz::authorize(
                    action,
                    &Relationship {
                        actor_lecturer: actor.as_ref().map(|l| &l.id),
                        owner: Some(&reference.owner_id),
                        owner_advisor: owner.as_ref().and_then(|s| s.advisor_id.as_ref()),
                        ..Relationship::default()
                    },
                )
            }
        };

        if result.is_err() {
            warn!(
                reference_id = %reference.id,
                %action,
                actor = %ctx.actor(),
                "authorization denied"
            );
        }
        result
    }

    async fn load_reference(
        &self,
        ctx: &RequestContext,
        id: &ReferenceId,
    ) -> Result<AchievementReference, LifecycleError> {
        ctx.bounded(self.stores.workflow.find_reference(id))
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// A reference without content breaks the pairing invariant; report it as
    /// not found like a missing reference.
    async fn load_content(
        &self,
        ctx: &RequestContext,
        reference: &AchievementReference,
    ) -> Result<AchievementContent, LifecycleError> {
        match ctx
            .bounded(self.stores.content.find(&reference.content_id))
            .await?
        {
            Some(content) => Ok(content),
            None => {
                error!(
                    reference_id = %reference.id,
                    content_id = %reference.content_id,
                    "reference points at missing content"
                );
                Err(not_found(&reference.id))
            }
        }
    }

    async fn student_name(&self, ctx: &RequestContext, owner: &StudentId) -> Option<String> {
        match ctx.bounded(self.stores.directory.student_by_id(owner)).await {
            Ok(student) => student.map(|s| s.full_name),
            Err(e) => {
                debug!(owner_id = %owner, error = %e, "student name lookup failed");
                None
            }
        }
    }
}

fn not_found(id: &ReferenceId) -> LifecycleError {
    LifecycleError::NotFound(format!("achievement {id}"))
}

/// The table only yields `Move` for status-changing actions; anything else
/// means the action was routed to the wrong handler.
fn unreachable_transition<T>(current: Status, action: Action) -> Result<T, LifecycleError> {
    Err(LifecycleError::InvalidTransition { current, action })
}

fn validate_patch(patch: &AchievementPatch) -> Result<(), LifecycleError> {
    if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(LifecycleError::Validation("title must not be empty".into()));
    }
    for attachment in &patch.add_attachments {
        if attachment.file_name.trim().is_empty() || attachment.file_url.trim().is_empty() {
            return Err(LifecycleError::Validation(
                "attachments need a file name and URL".into(),
            ));
        }
    }
    Ok(())
}
