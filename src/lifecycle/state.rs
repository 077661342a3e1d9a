use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::achievement::StatusHistoryEntry;

/// Workflow status of an achievement reference.
///
/// Each achievement flows through: DRAFT → SUBMITTED → VERIFIED, with
/// SUBMITTED → REJECTED → (DRAFT | SUBMITTED) as the correction loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Draft,
    Submitted,
    Verified,
    Rejected,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Draft,
        Status::Submitted,
        Status::Verified,
        Status::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Draft => "draft",
            Status::Submitted => "submitted",
            Status::Verified => "verified",
            Status::Rejected => "rejected",
        }
    }

    /// Whether the owner may still change content or delete in this state.
    pub fn is_owner_editable(&self) -> bool {
        matches!(self, Status::Draft | Status::Rejected)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Verified)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("unknown status '{s}'"))
    }
}

/// An action a caller can attempt against an achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Submit,
    Edit,
    Verify,
    Reject,
    Delete,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Submit,
        Action::Edit,
        Action::Verify,
        Action::Reject,
        Action::Delete,
    ];

    /// Which relationship the actor must hold to attempt this action.
    pub fn required_actor(&self) -> Actor {
        match self {
            Action::Submit | Action::Edit | Action::Delete => Actor::Owner,
            Action::Verify | Action::Reject => Actor::Advisor,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Submit => write!(f, "submit"),
            Action::Edit => write!(f, "edit"),
            Action::Verify => write!(f, "verify"),
            Action::Reject => write!(f, "reject"),
            Action::Delete => write!(f, "delete"),
        }
    }
}

/// The relationship an actor holds to an achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    Owner,
    Advisor,
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::Owner => write!(f, "owner"),
            Actor::Advisor => write!(f, "assigned advisor"),
        }
    }
}

/// The result of evaluating an action against the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Move the reference to a new status.
    Move { from: Status, to: Status },
    /// The action is legal but leaves the status untouched (editing a draft).
    Stay(Status),
    /// The reference and its content are removed.
    Remove,
}

/// An action attempted from a status that does not allow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {action} a {current} achievement")]
pub struct IllegalTransition {
    pub current: Status,
    pub action: Action,
}

/// The achievement workflow transition table.
pub struct StateMachine;

impl StateMachine {
    /// Compute the transition for `action` applied to `current`.
    ///
    /// - `draft` and `rejected` can be submitted by the owner.
    /// - Editing a `rejected` achievement sends it back to `draft`; editing a
    ///   `draft` keeps it there.
    /// - Only `submitted` achievements can be verified or rejected.
    /// - Only `draft` achievements can be deleted.
    /// - `verified` is terminal and accepts nothing.
    pub fn next(current: Status, action: Action) -> Result<Transition, IllegalTransition> {
        use Status::*;

        let transition = match (current, action) {
            (Draft | Rejected, Action::Submit) => Transition::Move {
                from: current,
                to: Submitted,
            },
            (Rejected, Action::Edit) => Transition::Move {
                from: Rejected,
                to: Draft,
            },
            (Draft, Action::Edit) => Transition::Stay(Draft),
            (Submitted, Action::Verify) => Transition::Move {
                from: Submitted,
                to: Verified,
            },
            (Submitted, Action::Reject) => Transition::Move {
                from: Submitted,
                to: Rejected,
            },
            (Draft, Action::Delete) => Transition::Remove,
            _ => return Err(IllegalTransition { current, action }),
        };
        Ok(transition)
    }

    /// Whether `from → to` is an edge of the table.
    pub fn is_edge(from: Status, to: Status) -> bool {
        Action::ALL.iter().any(|action| {
            matches!(
                Self::next(from, *action),
                Ok(Transition::Move { to: next, .. }) if next == to
            )
        })
    }

    /// Every legal status-changing `(from, action, to)` triple.
    pub fn edges() -> Vec<(Status, Action, Transition)> {
        let mut edges = Vec::new();
        for status in Status::ALL {
            for action in Action::ALL {
                if let Ok(transition) = Self::next(status, action) {
                    edges.push((status, action, transition));
                }
            }
        }
        edges
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("history must start with a creation entry, found {found:?} → {to}")]
    MissingCreation { found: Option<Status>, to: Status },

    #[error("entry {index} claims to leave {claimed} but the status was {actual}")]
    Discontinuous {
        index: usize,
        claimed: String,
        actual: Status,
    },

    #[error("entry {index} records an illegal move {from} → {to}")]
    IllegalEdge { index: usize, from: Status, to: Status },
}

/// Replay a reference's history in order and return the status it ends in.
///
/// An empty history yields `None`. The first entry must be the creation
/// entry (`none → draft`); every later entry must continue from the previous
/// `new_status` along an edge of the transition table.
pub fn replay(entries: &[StatusHistoryEntry]) -> Result<Option<Status>, ReplayError> {
    let mut current: Option<Status> = None;

    for (index, entry) in entries.iter().enumerate() {
        current = Some(match current {
            None => {
                if entry.old_status.is_some() || entry.new_status != Status::Draft {
                    return Err(ReplayError::MissingCreation {
                        found: entry.old_status,
                        to: entry.new_status,
                    });
                }
                Status::Draft
            }
            Some(actual) => {
                if entry.old_status != Some(actual) {
                    return Err(ReplayError::Discontinuous {
                        index,
                        claimed: entry
                            .old_status
                            .map_or_else(|| "none".to_string(), |s| s.to_string()),
                        actual,
                    });
                }
                if !StateMachine::is_edge(actual, entry.new_status) {
                    return Err(ReplayError::IllegalEdge {
                        index,
                        from: actual,
                        to: entry.new_status,
                    });
                }
                entry.new_status
            }
        });
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::achievement::{HistoryId, ReferenceId, UserId};
    use chrono::Utc;

    fn entry(old: Option<Status>, new: Status) -> StatusHistoryEntry {
        StatusHistoryEntry {
            id: HistoryId::new(),
            reference_id: ReferenceId::from_uuid(uuid::Uuid::nil()),
            old_status: old,
            new_status: new,
            changed_by: UserId::from_uuid(uuid::Uuid::nil()),
            note: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn table_matches_documented_edges() {
        use Status::*;
        assert_eq!(
            StateMachine::next(Draft, Action::Submit),
            Ok(Transition::Move { from: Draft, to: Submitted })
        );
        assert_eq!(
            StateMachine::next(Rejected, Action::Submit),
            Ok(Transition::Move { from: Rejected, to: Submitted })
        );
        assert_eq!(
            StateMachine::next(Rejected, Action::Edit),
            Ok(Transition::Move { from: Rejected, to: Draft })
        );
        assert_eq!(StateMachine::next(Draft, Action::Edit), Ok(Transition::Stay(Draft)));
        assert_eq!(
            StateMachine::next(Submitted, Action::Verify),
            Ok(Transition::Move { from: Submitted, to: Verified })
        );
        assert_eq!(
            StateMachine::next(Submitted, Action::Reject),
            Ok(Transition::Move { from: Submitted, to: Rejected })
        );
        assert_eq!(StateMachine::next(Draft, Action::Delete), Ok(Transition::Remove));
    }

    #[test]
    fn every_unlisted_pair_is_rejected() {
        let legal = [
            (Status::Draft, Action::Submit),
            (Status::Rejected, Action::Submit),
            (Status::Rejected, Action::Edit),
            (Status::Draft, Action::Edit),
            (Status::Submitted, Action::Verify),
            (Status::Submitted, Action::Reject),
            (Status::Draft, Action::Delete),
        ];
        for status in Status::ALL {
            for action in Action::ALL {
                let result = StateMachine::next(status, action);
                if legal.contains(&(status, action)) {
                    assert!(result.is_ok(), "{action} from {status} should be legal");
                } else {
                    assert_eq!(
                        result,
                        Err(IllegalTransition { current: status, action }),
                        "{action} from {status} should be illegal"
                    );
                }
            }
        }
    }

    #[test]
    fn verified_is_terminal() {
        assert!(Status::Verified.is_terminal());
        for action in Action::ALL {
            assert!(StateMachine::next(Status::Verified, action).is_err());
        }
    }

    #[test]
    fn illegal_transition_message_names_state_and_action() {
        let err = StateMachine::next(Status::Draft, Action::Verify).unwrap_err();
        assert_eq!(err.to_string(), "cannot verify a draft achievement");
    }

    #[test]
    fn required_actor_per_action() {
        assert_eq!(Action::Submit.required_actor(), Actor::Owner);
        assert_eq!(Action::Edit.required_actor(), Actor::Owner);
        assert_eq!(Action::Delete.required_actor(), Actor::Owner);
        assert_eq!(Action::Verify.required_actor(), Actor::Advisor);
        assert_eq!(Action::Reject.required_actor(), Actor::Advisor);
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Submitted".parse::<Status>(), Ok(Status::Submitted));
        assert!("archived".parse::<Status>().is_err());
    }

    #[test]
    fn replay_reconstructs_final_status() {
        use Status::*;
        let history = vec![
            entry(None, Draft),
            entry(Some(Draft), Submitted),
            entry(Some(Submitted), Rejected),
            entry(Some(Rejected), Draft),
            entry(Some(Draft), Submitted),
            entry(Some(Submitted), Verified),
        ];
        assert_eq!(replay(&history), Ok(Some(Verified)));
        assert_eq!(replay(&[]), Ok(None));
    }

    #[test]
    fn replay_rejects_gaps_and_illegal_edges() {
        use Status::*;
        let gap = vec![entry(None, Draft), entry(Some(Submitted), Verified)];
        assert!(matches!(replay(&gap), Err(ReplayError::Discontinuous { index: 1, .. })));

        let illegal = vec![entry(None, Draft), entry(Some(Draft), Verified)];
        assert!(matches!(replay(&illegal), Err(ReplayError::IllegalEdge { index: 1, .. })));

        let headless = vec![entry(Some(Draft), Submitted)];
        assert!(matches!(replay(&headless), Err(ReplayError::MissingCreation { .. })));
    }

    #[test]
    fn edges_list_contains_only_legal_moves() {
        let edges = StateMachine::edges();
        assert_eq!(edges.len(), 7);
        assert!(StateMachine::is_edge(Status::Submitted, Status::Verified));
        assert!(!StateMachine::is_edge(Status::Verified, Status::Draft));
        assert!(!StateMachine::is_edge(Status::Draft, Status::Draft));
    }
}
