//! Read-only achievement statistics.
//!
//! The engine gathers status counts from the workflow store and joins the
//! matching content documents for per-type breakdowns. Aggregation here is
//! pure; every sub-query that failed upstream is reported through `degraded`.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::lifecycle::{AchievementContent, AchievementType, Status, StudentId};
use crate::scoring::COMPETITION_LEVEL_KEY;

/// Which achievements to aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatisticsQuery {
    /// `None` aggregates every owner.
    pub owners: Option<Vec<StudentId>>,
    /// Restricts both the status counts and the per-type breakdown.
    pub status: Option<Status>,
}

impl StatisticsQuery {
    pub fn owner(owner: StudentId) -> Self {
        Self {
            owners: Some(vec![owner]),
            status: None,
        }
    }

    pub fn all() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopStudent {
    pub owner_id: StudentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub total_points: u64,
    pub achievements: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total: usize,
    pub draft: usize,
    pub submitted: usize,
    pub verified: usize,
    pub rejected: usize,
    pub by_status: BTreeMap<Status, usize>,
    pub by_type: BTreeMap<AchievementType, usize>,
    pub by_competition_level: BTreeMap<String, usize>,
    pub top_students: Vec<TopStudent>,
    /// Content documents that a reference pointed at but could not be read.
    pub missing_content: usize,
    /// At least one sub-query failed; the affected figures are zero.
    pub degraded: bool,
}

/// Accumulates the pieces of a [`Statistics`] report.
#[derive(Debug)]
pub struct StatisticsBuilder {
    stats: Statistics,
    points: HashMap<StudentId, (u64, usize)>,
    top_n: usize,
}

impl StatisticsBuilder {
    pub fn new(top_n: usize) -> Self {
        Self {
            stats: Statistics::default(),
            points: HashMap::new(),
            top_n,
        }
    }

    pub fn status_counts(&mut self, counts: BTreeMap<Status, usize>) -> &mut Self {
        let count = |status: Status| counts.get(&status).copied().unwrap_or(0);
        self.stats.draft = count(Status::Draft);
        self.stats.submitted = count(Status::Submitted);
        self.stats.verified = count(Status::Verified);
        self.stats.rejected = count(Status::Rejected);
        self.stats.total = counts.values().sum();
        self.stats.by_status = counts;
        self
    }

    pub fn contents(&mut self, contents: &[AchievementContent]) -> &mut Self {
        for content in contents {
            *self
                .stats
                .by_type
                .entry(content.achievement_type)
                .or_insert(0) += 1;

            if content.achievement_type == AchievementType::Competition
                && let Some(level) = content
                    .details
                    .get(COMPETITION_LEVEL_KEY)
                    .and_then(|v| v.as_str())
            {
                *self
                    .stats
                    .by_competition_level
                    .entry(level.to_string())
                    .or_insert(0) += 1;
            }

            let entry = self.points.entry(content.owner_id).or_insert((0, 0));
            entry.0 += u64::from(content.points);
            entry.1 += 1;
        }
        self
    }

    pub fn missing(&mut self, count: usize) -> &mut Self {
        self.stats.missing_content += count;
        self
    }

    pub fn degrade(&mut self) -> &mut Self {
        self.stats.degraded = true;
        self
    }

    /// Finish the report. Top students are ranked by points, then count, then id.
    pub fn build(mut self) -> Statistics {
        let mut ranked: Vec<TopStudent> = self
            .points
            .into_iter()
            .map(|(owner_id, (total_points, achievements))| TopStudent {
                owner_id,
                full_name: None,
                total_points,
                achievements,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then(b.achievements.cmp(&a.achievements))
                .then(a.owner_id.cmp(&b.owner_id))
        });
        ranked.truncate(self.top_n);
        self.stats.top_students = ranked;
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{ContentId, Details};
    use chrono::Utc;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn content(owner: StudentId, kind: AchievementType, points: u32, level: Option<&str>) -> AchievementContent {
        let mut details = Details::new();
        if let Some(level) = level {
            details.insert(COMPETITION_LEVEL_KEY.into(), json!(level));
        }
        AchievementContent {
            id: ContentId::new(uuid::Uuid::new_v4().to_string()),
            owner_id: owner,
            achievement_type: kind,
            title: "x".into(),
            description: String::new(),
            details,
            tags: BTreeSet::new(),
            attachments: Vec::new(),
            points,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn status_totals_follow_counts() {
        let mut builder = StatisticsBuilder::new(5);
        builder.status_counts(BTreeMap::from([
            (Status::Draft, 2),
            (Status::Submitted, 3),
            (Status::Verified, 4),
        ]));
        let stats = builder.build();
        assert_eq!(stats.total, 9);
        assert_eq!(stats.submitted, 3);
        assert_eq!(stats.rejected, 0);
        assert!(!stats.degraded);
    }

    #[test]
    fn type_level_and_ranking() {
        let a = StudentId::new();
        let b = StudentId::new();
        let mut builder = StatisticsBuilder::new(1);
        builder.contents(&[
            content(a, AchievementType::Competition, 250, Some("international")),
            content(b, AchievementType::Competition, 150, Some("national")),
            content(b, AchievementType::Academic, 70, None),
        ]);
        let stats = builder.build();

        assert_eq!(stats.by_type.get(&AchievementType::Competition), Some(&2));
        assert_eq!(stats.by_type.get(&AchievementType::Academic), Some(&1));
        assert_eq!(stats.by_competition_level.get("international"), Some(&1));
        assert_eq!(stats.top_students.len(), 1);
        assert_eq!(stats.top_students[0].owner_id, a);
        assert_eq!(stats.top_students[0].total_points, 250);
    }

    #[test]
    fn degraded_report_keeps_partial_figures() {
        let mut builder = StatisticsBuilder::new(3);
        builder
            .status_counts(BTreeMap::from([(Status::Verified, 1)]))
            .missing(2)
            .degrade();
        let stats = builder.build();
        assert!(stats.degraded);
        assert_eq!(stats.verified, 1);
        assert_eq!(stats.missing_content, 2);
        assert!(stats.by_type.is_empty());
    }
}
