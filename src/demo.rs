//! Built-in walkthrough of the achievement lifecycle.
//!
//! Runs the reference scenarios against in-memory stores and prints each
//! step. Any scenario that does not end the way it should aborts the run.

use std::sync::Arc;

use anyhow::{Result, bail, ensure};
use serde_json::json;
use tracing::info;

use crate::config::LaurelConfig;
use crate::error::{ErrorKind, LifecycleError};
use crate::lifecycle::{
    AchievementPatch, CreateAchievementRequest, Details, LifecycleEngine, Principal,
    RequestContext, Role, Status, Stores, replay,
};
use crate::store::{
    MemoryContentStore, MemoryDirectory, MemoryReconciliationQueue, MemoryWorkflowStore,
};
use crate::ui::Terminal;

pub async fn run(config: &LaurelConfig, term: &Terminal) -> Result<()> {
    let directory = Arc::new(MemoryDirectory::new());
    let advisor = directory.add_lecturer("Dr. Sari Wulandari");
    let stranger = directory.add_lecturer("Dr. Hendra Gunawan");
    let student = directory.add_student("Budi Santoso", Some(advisor.id));

    let engine = LifecycleEngine::new(
        Stores {
            content: Arc::new(MemoryContentStore::new()),
            workflow: Arc::new(MemoryWorkflowStore::new()),
            directory,
            reconciliation: Arc::new(MemoryReconciliationQueue::new()),
        },
        config.clone(),
    );
    let ctx = |user, role| RequestContext::new(Principal::new(user, role), config.request_timeout());
    let owner = ctx(student.user_id, Role::Student);
    let adviser = ctx(advisor.user_id, Role::Advisor);
    let outsider = ctx(stranger.user_id, Role::Advisor);

    term.heading("A: create an international competition win");
    let created = engine
        .create(
            &owner,
            CreateAchievementRequest {
                achievement_type: "competition".into(),
                title: "ASEAN Robotics Championship".into(),
                description: "First place, autonomous category".into(),
                details: Details::from([
                    ("competitionLevel".to_string(), json!("international")),
                    ("rank".to_string(), json!(1)),
                ]),
                tags: ["robotics".to_string()].into(),
            },
        )
        .await?;
    term.print_warnings(&created.warnings);
    let view = created.into_inner();
    term.print_view(&view);
    ensure!(view.points == 250, "expected 250 points, got {}", view.points);
    let id = view.reference_id;

    term.heading("B: submit for verification");
    let submitted = engine.submit(&owner, &id, None).await?;
    term.print_warnings(&submitted.warnings);
    term.print_view(&engine.get(&owner, &id).await?);

    term.heading("C: reject, then edit back to draft");
    engine.reject(&adviser, &id, "incomplete evidence").await?;
    term.print_view(&engine.get(&owner, &id).await?);
    let edited = engine
        .update(
            &owner,
            &id,
            AchievementPatch {
                description: Some("First place, autonomous category; certificate attached".into()),
                ..AchievementPatch::default()
            },
        )
        .await?;
    term.print_view(&edited.value);
    ensure!(
        edited.value.status == Status::Draft && edited.value.rejection_note.is_none(),
        "edit after rejection should return to a clean draft"
    );
    engine.submit(&owner, &id, Some("evidence added".into())).await?;

    term.heading("D: verify by someone else's advisor");
    expect_refusal(
        term,
        engine.verify(&outsider, &id, None).await.map(drop),
        ErrorKind::Authorization,
    )?;
    engine.verify(&adviser, &id, Some("certificate checked".into())).await?;
    term.success("verified by the assigned advisor");

    term.heading("E: delete outside draft");
    let second = engine
        .create(
            &owner,
            CreateAchievementRequest {
                achievement_type: "academic".into(),
                title: "Dean's list, fall semester".into(),
                ..CreateAchievementRequest::default()
            },
        )
        .await?
        .into_inner();
    engine.submit(&owner, &second.reference_id, None).await?;
    expect_refusal(
        term,
        engine.delete(&owner, &second.reference_id).await,
        ErrorKind::InvalidTransition,
    )?;
    term.print_view(&engine.get(&owner, &second.reference_id).await?);

    term.heading("History");
    let history = engine.history(&owner, &id).await?;
    term.print_history(&history);
    let replayed = replay(&history)?;
    let current = engine.get(&owner, &id).await?.status;
    ensure!(
        replayed == Some(current),
        "history replays to {replayed:?} but status is {current}"
    );
    term.success("history replays to the current status");

    term.heading("Statistics");
    term.print_statistics(&engine.statistics_for_role(&adviser).await?);

    info!("demo finished");
    Ok(())
}

fn expect_refusal(
    term: &Terminal,
    result: Result<(), LifecycleError>,
    kind: ErrorKind,
) -> Result<()> {
    match result {
        Err(e) if e.kind() == kind => {
            term.expected_error(&e);
            Ok(())
        }
        Err(e) => Err(e.into()),
        Ok(()) => bail!("expected a {kind} error, but the operation succeeded"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn demo_runs_to_completion() {
        let config = LaurelConfig::default();
        run(&config, &Terminal::new()).await.unwrap();
    }

    #[test]
    fn refusal_of_another_kind_is_an_error() {
        let term = Terminal::new();
        let wrong = Err(LifecycleError::NotFound("achievement".into()));
        assert!(expect_refusal(&term, wrong, ErrorKind::Authorization).is_err());
        assert!(expect_refusal(&term, Ok(()), ErrorKind::Authorization).is_err());

        let right = Err(LifecycleError::Authorization("no".into()));
        assert!(expect_refusal(&term, right, ErrorKind::Authorization).is_ok());
    }
}
