//! Authorization gate for lifecycle actions.
//!
//! Pure predicates over identities already resolved by the engine. They are
//! evaluated before the transition table so that a non-owner never learns
//! what state someone else's achievement is in.

use crate::error::LifecycleError;
use crate::lifecycle::{Action, Actor, LecturerId, StudentId};

/// The actor owns the achievement.
pub fn is_owner(actor: Option<&StudentId>, owner: &StudentId) -> bool {
    actor == Some(owner)
}

/// The actor is the owning student's assigned advisor.
///
/// Fails closed when either side is unknown, including students without an advisor.
pub fn is_assigned_advisor(actor: Option<&LecturerId>, advisor: Option<&LecturerId>) -> bool {
    match (actor, advisor) {
        (Some(actor), Some(advisor)) => actor == advisor,
        _ => false,
    }
}

/// Identities the engine resolved for the caller and the achievement.
#[derive(Debug, Clone, Copy, Default)]
pub struct Relationship<'a> {
    pub actor_student: Option<&'a StudentId>,
    pub actor_lecturer: Option<&'a LecturerId>,
    pub owner: Option<&'a StudentId>,
    pub owner_advisor: Option<&'a LecturerId>,
}

/// Check that the actor may attempt `action`.
pub fn authorize(action: Action, rel: &Relationship<'_>) -> Result<(), LifecycleError> {
    let allowed = match action.required_actor() {
        Actor::Owner => rel
            .owner
            .is_some_and(|owner| is_owner(rel.actor_student, owner)),
        Actor::Advisor => is_assigned_advisor(rel.actor_lecturer, rel.owner_advisor),
    };

    if allowed {
        Ok(())
    } else {
        Err(LifecycleError::Authorization(format!(
            "only the {} may {action} this achievement",
            action.required_actor()
        )))
    }
}
