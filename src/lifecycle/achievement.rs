//! Achievement data model shared by both stores and the engine.
//!
//! [`AchievementContent`] lives in the document store, [`AchievementReference`]
//! and [`StatusHistoryEntry`] live in the workflow store, and
//! [`AchievementView`] is the merged read-model handed to callers.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::Status;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

uuid_id!(
    /// Authenticated account identity.
    UserId
);
uuid_id!(
    /// Student profile identity; owns achievements.
    StudentId
);
uuid_id!(
    /// Lecturer profile identity; advises students.
    LecturerId
);
uuid_id!(
    /// Primary key of a workflow reference row.
    ReferenceId
);
uuid_id!(HistoryId);

/// Opaque document id assigned by the content store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category of an achievement. Drives base scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementType {
    Academic,
    Competition,
    Organization,
    Publication,
    Certification,
    Other,
}

impl AchievementType {
    pub const ALL: [AchievementType; 6] = [
        AchievementType::Academic,
        AchievementType::Competition,
        AchievementType::Organization,
        AchievementType::Publication,
        AchievementType::Certification,
        AchievementType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementType::Academic => "academic",
            AchievementType::Competition => "competition",
            AchievementType::Organization => "organization",
            AchievementType::Publication => "publication",
            AchievementType::Certification => "certification",
            AchievementType::Other => "other",
        }
    }
}

impl fmt::Display for AchievementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AchievementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        AchievementType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| format!("unknown achievement type '{s}'"))
    }
}

/// Free-form, type-dependent achievement fields (`competitionLevel`, `rank`, ...).
pub type Details = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    pub file_url: String,
    pub file_type: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Content fields ready to be inserted; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewContent {
    pub owner_id: StudentId,
    pub achievement_type: AchievementType,
    pub title: String,
    pub description: String,
    pub details: Details,
    pub tags: BTreeSet<String>,
    pub attachments: Vec<Attachment>,
    pub points: u32,
}

/// The achievement document held by the content store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementContent {
    pub id: ContentId,
    pub owner_id: StudentId,
    pub achievement_type: AchievementType,
    pub title: String,
    pub description: String,
    pub details: Details,
    pub tags: BTreeSet<String>,
    pub attachments: Vec<Attachment>,
    pub points: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The workflow row held by the relational store. Authoritative for status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementReference {
    pub id: ReferenceId,
    pub owner_id: StudentId,
    pub content_id: ContentId,
    pub status: Status,
    pub submitted_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<UserId>,
    pub rejection_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AchievementReference {
    /// A fresh `draft` reference pointing at `content`.
    pub fn draft_for(content: &AchievementContent) -> Self {
        let now = Utc::now();
        Self {
            id: ReferenceId::new(),
            owner_id: content.owner_id,
            content_id: content.id.clone(),
            status: Status::Draft,
            submitted_at: None,
            verified_at: None,
            verified_by: None,
            rejection_note: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The row as it should look after moving to `to`.
    ///
    /// Leaving `rejected` always clears the rejection note.
    pub fn moved_to(&self, to: Status, actor: UserId, note: Option<&str>) -> Self {
        let now = Utc::now();
        let mut next = self.clone();
        next.status = to;
        next.updated_at = now;
        next.rejection_note = None;
        match to {
            Status::Submitted => next.submitted_at = Some(now),
            Status::Verified => {
                next.verified_at = Some(now);
                next.verified_by = Some(actor);
            }
            Status::Rejected => next.rejection_note = note.map(str::to_string),
            Status::Draft => {}
        }
        next
    }
}

/// Append-only audit row for one status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub id: HistoryId,
    pub reference_id: ReferenceId,
    /// `None` only for the creation entry.
    pub old_status: Option<Status>,
    pub new_status: Status,
    pub changed_by: UserId,
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl StatusHistoryEntry {
    pub fn record(
        reference_id: ReferenceId,
        old_status: Option<Status>,
        new_status: Status,
        changed_by: UserId,
        note: Option<String>,
    ) -> Self {
        Self {
            id: HistoryId::new(),
            reference_id,
            old_status,
            new_status,
            changed_by,
            note,
            timestamp: Utc::now(),
        }
    }
}

/// Input to `create`. The type arrives as raw text and is validated by the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAchievementRequest {
    pub achievement_type: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub details: Details,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

/// Owner edits. `None` keeps the current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AchievementPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub details: Option<Details>,
    pub tags: Option<BTreeSet<String>>,
    #[serde(default)]
    pub add_attachments: Vec<Attachment>,
}

impl AchievementPatch {
    pub fn attach(attachment: Attachment) -> Self {
        Self {
            add_attachments: vec![attachment],
            ..Self::default()
        }
    }

    /// Apply onto `content`. Points are left for the caller to recompute.
    pub fn apply_to(self, content: &mut AchievementContent) {
        if let Some(title) = self.title {
            content.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            content.description = description;
        }
        if let Some(details) = self.details {
            content.details = details;
        }
        if let Some(tags) = self.tags {
            content.tags = tags;
        }
        content.attachments.extend(self.add_attachments);
    }
}

/// Presentation merge of content and workflow fields. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementView {
    pub reference_id: ReferenceId,
    pub content_id: ContentId,
    pub owner_id: StudentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    pub achievement_type: AchievementType,
    pub title: String,
    pub description: String,
    pub details: Details,
    pub tags: BTreeSet<String>,
    pub attachments: Vec<Attachment>,
    pub points: u32,
    pub status: Status,
    pub submitted_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<UserId>,
    pub rejection_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AchievementView {
    pub fn merge(reference: &AchievementReference, content: AchievementContent) -> Self {
        Self {
            reference_id: reference.id,
            content_id: content.id,
            owner_id: reference.owner_id,
            student_name: None,
            achievement_type: content.achievement_type,
            title: content.title,
            description: content.description,
            details: content.details,
            tags: content.tags,
            attachments: content.attachments,
            points: content.points,
            status: reference.status,
            submitted_at: reference.submitted_at,
            verified_at: reference.verified_at,
            verified_by: reference.verified_by,
            rejection_note: reference.rejection_note.clone(),
            created_at: content.created_at,
            updated_at: content.updated_at.max(reference.updated_at),
        }
    }

    pub fn with_student_name(mut self, name: Option<String>) -> Self {
        self.student_name = name;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> AchievementContent {
        let now = Utc::now();
        AchievementContent {
            id: ContentId::new("c-1"),
            owner_id: StudentId::new(),
            achievement_type: AchievementType::Publication,
            title: "Paper".into(),
            description: String::new(),
            details: Details::new(),
            tags: BTreeSet::new(),
            attachments: Vec::new(),
            points: 80,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn achievement_type_parses_known_values_only() {
        assert_eq!(
            " Competition ".parse::<AchievementType>(),
            Ok(AchievementType::Competition)
        );
        assert!("hackathon".parse::<AchievementType>().is_err());
        assert!("".parse::<AchievementType>().is_err());
    }

    #[test]
    fn draft_reference_pairs_with_content() {
        let content = content();
        let reference = AchievementReference::draft_for(&content);
        assert_eq!(reference.status, Status::Draft);
        assert_eq!(reference.owner_id, content.owner_id);
        assert_eq!(reference.content_id, content.id);
        assert!(reference.submitted_at.is_none());
    }

    #[test]
    fn moving_sets_workflow_timestamps() {
        let reference = AchievementReference::draft_for(&content());
        let actor = UserId::new();

        let submitted = reference.moved_to(Status::Submitted, actor, None);
        assert!(submitted.submitted_at.is_some());

        let rejected = submitted.moved_to(Status::Rejected, actor, Some("blurry scan"));
        assert_eq!(rejected.rejection_note.as_deref(), Some("blurry scan"));

        let draft = rejected.moved_to(Status::Draft, actor, None);
        assert!(draft.rejection_note.is_none());

        let verified = submitted.moved_to(Status::Verified, actor, Some("ok"));
        assert_eq!(verified.verified_by, Some(actor));
        assert!(verified.verified_at.is_some());
        assert!(verified.rejection_note.is_none());
    }

    #[test]
    fn patch_keeps_absent_fields_and_appends_attachments() {
        let mut content = content();
        let patch = AchievementPatch {
            title: Some("  Journal paper ".into()),
            ..AchievementPatch::attach(Attachment {
                file_name: "paper.pdf".into(),
                file_url: "https://files.example/paper.pdf".into(),
                file_type: "application/pdf".into(),
                uploaded_at: Utc::now(),
            })
        };
        patch.apply_to(&mut content);
        assert_eq!(content.title, "Journal paper");
        assert_eq!(content.achievement_type, AchievementType::Publication);
        assert_eq!(content.attachments.len(), 1);
    }

    #[test]
    fn view_serializes_status_lowercase() {
        let content = content();
        let reference = AchievementReference::draft_for(&content);
        let view = AchievementView::merge(&reference, content);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "draft");
        assert_eq!(json["achievement_type"], "publication");
        assert!(json.get("student_name").is_none());
    }
}
