mod achievement;
mod context;
mod engine;
mod receipt;
mod state;

pub use achievement::{
    AchievementContent, AchievementPatch, AchievementReference, AchievementType, AchievementView,
    Attachment, ContentId, CreateAchievementRequest, Details, HistoryId, LecturerId, NewContent,
    ReferenceId, StatusHistoryEntry, StudentId, UserId,
};
pub use context::{Principal, RequestContext, Role};
pub use engine::{LifecycleEngine, ListFilter, Page, Stores};
pub use receipt::{Receipt, Warning};
pub use state::{
    Action, Actor, IllegalTransition, ReplayError, StateMachine, Status, Transition, replay,
};
