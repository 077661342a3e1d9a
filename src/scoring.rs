//! Deterministic achievement scoring.
//!
//! Points are a pure function of achievement type and detail fields. They are
//! recomputed on every content write and never accepted from callers.

use crate::lifecycle::{AchievementType, Details};

/// Base points per achievement type.
const BASE_POINTS: &[(AchievementType, u32)] = &[
    (AchievementType::Competition, 100),
    (AchievementType::Publication, 80),
    (AchievementType::Academic, 70),
    (AchievementType::Certification, 60),
    (AchievementType::Organization, 50),
    (AchievementType::Other, 30),
];

/// Competition bonus keyed by the `competitionLevel` detail.
const LEVEL_BONUS: &[(&str, u32)] = &[
    ("international", 100),
    ("national", 50),
    ("regional", 25),
];

/// Competition bonus keyed by the numeric `rank` detail.
const RANK_BONUS: &[(u32, u32)] = &[(1, 50), (2, 30), (3, 20)];

pub const COMPETITION_LEVEL_KEY: &str = "competitionLevel";
pub const RANK_KEY: &str = "rank";

pub struct Scorer;

impl Scorer {
    /// Points for an achievement. Total: unknown or malformed details add nothing.
    pub fn points(achievement_type: AchievementType, details: &Details) -> u32 {
        let base = BASE_POINTS
            .iter()
            .find(|(kind, _)| *kind == achievement_type)
            .map_or(0, |(_, points)| *points);

        if achievement_type != AchievementType::Competition {
            return base;
        }

        base + Self::level_bonus(details) + Self::rank_bonus(details)
    }

    fn level_bonus(details: &Details) -> u32 {
        details
            .get(COMPETITION_LEVEL_KEY)
            .and_then(|v| v.as_str())
            .and_then(|level| LEVEL_BONUS.iter().find(|(name, _)| *name == level))
            .map_or(0, |(_, bonus)| *bonus)
    }

    fn rank_bonus(details: &Details) -> u32 {
        // Ranks must be whole numbers; 1.5 earns nothing.
        let Some(rank) = details.get(RANK_KEY).and_then(|v| v.as_f64()) else {
            return 0;
        };
        RANK_BONUS
            .iter()
            .find(|(place, _)| f64::from(*place) == rank)
            .map_or(0, |(_, bonus)| *bonus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn details(pairs: &[(&str, serde_json::Value)]) -> Details {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn base_points_order_competition_highest_other_lowest() {
        let empty = Details::new();
        let scores: Vec<u32> = AchievementType::ALL
            .iter()
            .map(|kind| Scorer::points(*kind, &empty))
            .collect();
        let max = *scores.iter().max().unwrap();
        let min = *scores.iter().min().unwrap();
        assert_eq!(Scorer::points(AchievementType::Competition, &empty), max);
        assert_eq!(Scorer::points(AchievementType::Other, &empty), min);
    }

    #[test]
    fn international_first_place_scores_250() {
        let d = details(&[
            ("competitionLevel", json!("international")),
            ("rank", json!(1)),
        ]);
        assert_eq!(Scorer::points(AchievementType::Competition, &d), 250);
    }

    #[test]
    fn level_and_rank_bonuses_stack() {
        let d = details(&[("competitionLevel", json!("national")), ("rank", json!(2))]);
        assert_eq!(Scorer::points(AchievementType::Competition, &d), 180);

        let d = details(&[("competitionLevel", json!("regional")), ("rank", json!(3.0))]);
        assert_eq!(Scorer::points(AchievementType::Competition, &d), 145);
    }

    #[test]
    fn unknown_or_malformed_details_add_nothing() {
        let d = details(&[
            ("competitionLevel", json!("galactic")),
            ("rank", json!("1")),
        ]);
        assert_eq!(Scorer::points(AchievementType::Competition, &d), 100);

        let d = details(&[("rank", json!(4))]);
        assert_eq!(Scorer::points(AchievementType::Competition, &d), 100);

        let d = details(&[("rank", json!(1.5)), ("competitionLevel", json!(7))]);
        assert_eq!(Scorer::points(AchievementType::Competition, &d), 100);
    }

    #[test]
    fn bonuses_only_apply_to_competitions() {
        let d = details(&[
            ("competitionLevel", json!("international")),
            ("rank", json!(1)),
        ]);
        assert_eq!(Scorer::points(AchievementType::Publication, &d), 80);
        assert_eq!(Scorer::points(AchievementType::Other, &d), 30);
    }

    #[test]
    fn scoring_is_deterministic() {
        let d = details(&[("competitionLevel", json!("national")), ("rank", json!(1))]);
        for kind in AchievementType::ALL {
            assert_eq!(Scorer::points(kind, &d), Scorer::points(kind, &d));
        }
    }
}
