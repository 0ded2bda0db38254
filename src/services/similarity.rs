//! Set-overlap scoring primitives.
//!
//! Everything in here is pure: no IO, no clock, no allocation beyond the
//! result structs. The recommendation service composes these into ranked
//! results.

use std::collections::HashSet;

/// Relative weight of skill overlap in the combined score
pub const SKILL_WEIGHT: f64 = 0.6;
/// Relative weight of interest/category overlap in the combined score
pub const CATEGORY_WEIGHT: f64 = 0.4;

/// Jaccard similarity between two id sets
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapScore {
    /// |intersection| / |union|, in [0.0, 1.0]
    pub score: f64,
    /// `score` as a rounded whole percentage
    pub percentage: u32,
    /// Ids present in both sets, ascending
    pub matching_ids: Vec<i64>,
    pub matching_count: usize,
    pub union_count: usize,
}

impl OverlapScore {
    /// Whether either side declared any ids at all
    pub fn is_applicable(&self) -> bool {
        self.union_count > 0
    }
}

/// Computes |A ∩ B| / |A ∪ B|
///
/// Two empty sets carry no signal and score 0.0, never NaN.
pub fn jaccard_overlap(left: &HashSet<i64>, right: &HashSet<i64>) -> OverlapScore {
    let union_count = left.union(right).count();

    if union_count == 0 {
        return OverlapScore {
            score: 0.0,
            percentage: 0,
            matching_ids: Vec::new(),
            matching_count: 0,
            union_count: 0,
        };
    }

    let mut matching_ids: Vec<i64> = left.intersection(right).copied().collect();
    matching_ids.sort_unstable();

    let matching_count = matching_ids.len();
    let score = matching_count as f64 / union_count as f64;

    OverlapScore {
        score,
        percentage: to_percentage(score),
        matching_ids,
        matching_count,
        union_count,
    }
}

/// Combined similarity for one candidate project
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedScore {
    pub score: f64,
    pub percentage: u32,
    pub skills: OverlapScore,
    pub categories: OverlapScore,
}

/// Blends skill and category overlap into one score
///
/// A component participates only when at least one side declared ids for it,
/// and the weights renormalize over the participating components. A project
/// matched for a user with no stated interests is therefore scored on skills
/// alone; when neither component applies the score is 0.0.
pub fn combined_score(
    user_skills: &HashSet<i64>,
    project_skills: &HashSet<i64>,
    user_interests: &HashSet<i64>,
    project_categories: &HashSet<i64>,
) -> CombinedScore {
    let skills = jaccard_overlap(user_skills, project_skills);
    let categories = jaccard_overlap(user_interests, project_categories);

    let mut weighted = 0.0;
    let mut total_weight = 0.0;

    if skills.is_applicable() {
        weighted += SKILL_WEIGHT * skills.score;
        total_weight += SKILL_WEIGHT;
    }
    if categories.is_applicable() {
        weighted += CATEGORY_WEIGHT * categories.score;
        total_weight += CATEGORY_WEIGHT;
    }

    let score = if total_weight > 0.0 {
        weighted / total_weight
    } else {
        0.0
    };

    CombinedScore {
        score,
        percentage: to_percentage(score),
        skills,
        categories,
    }
}

fn to_percentage(score: f64) -> u32 {
    (score * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[i64]) -> HashSet<i64> {
        values.iter().copied().collect()
    }

    #[test]
    fn test_jaccard_identical_sets_is_one() {
        let score = jaccard_overlap(&ids(&[1, 2, 3]), &ids(&[1, 2, 3]));
        assert_eq!(score.score, 1.0);
        assert_eq!(score.percentage, 100);
        assert_eq!(score.matching_count, 3);
    }

    #[test]
    fn test_jaccard_disjoint_sets_is_zero() {
        let score = jaccard_overlap(&ids(&[1, 2]), &ids(&[3, 4]));
        assert_eq!(score.score, 0.0);
        assert_eq!(score.percentage, 0);
        assert!(score.matching_ids.is_empty());
        assert_eq!(score.union_count, 4);
    }

    #[test]
    fn test_jaccard_partial_overlap() {
        // two shared ids out of three distinct
        let score = jaccard_overlap(&ids(&[1, 2, 3]), &ids(&[1, 2]));
        assert!((score.score - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(score.percentage, 67);
        assert_eq!(score.matching_count, 2);
        assert_eq!(score.union_count, 3);
    }

    #[test]
    fn test_jaccard_low_overlap() {
        // one shared id out of five distinct
        let score = jaccard_overlap(&ids(&[1, 2, 3]), &ids(&[1, 4, 5]));
        assert!((score.score - 0.2).abs() < 1e-9);
        assert_eq!(score.percentage, 20);
    }

    #[test]
    fn test_jaccard_both_empty_is_zero_not_nan() {
        let score = jaccard_overlap(&ids(&[]), &ids(&[]));
        assert_eq!(score.score, 0.0);
        assert!(!score.score.is_nan());
        assert!(!score.is_applicable());
    }

    #[test]
    fn test_jaccard_one_empty_side_is_zero_but_applicable() {
        let score = jaccard_overlap(&ids(&[1, 2]), &ids(&[]));
        assert_eq!(score.score, 0.0);
        assert_eq!(score.union_count, 2);
        assert!(score.is_applicable());
    }

    #[test]
    fn test_jaccard_is_symmetric() {
        let a = ids(&[1, 2, 3, 4]);
        let b = ids(&[3, 4, 5]);
        assert_eq!(jaccard_overlap(&a, &b).score, jaccard_overlap(&b, &a).score);
    }

    #[test]
    fn test_jaccard_matching_ids_are_sorted() {
        let score = jaccard_overlap(&ids(&[9, 4, 7, 1]), &ids(&[7, 1, 9, 100]));
        assert_eq!(score.matching_ids, vec![1, 7, 9]);
    }

    #[test]
    fn test_jaccard_score_stays_in_bounds() {
        let cases: [(Vec<i64>, Vec<i64>); 5] = [
            (vec![], vec![]),
            (vec![1], vec![]),
            (vec![1], vec![1]),
            (vec![1, 2, 3], vec![2, 3, 4]),
            (vec![1, 2], vec![3, 4]),
        ];

        for (a, b) in cases {
            let score = jaccard_overlap(&ids(&a), &ids(&b)).score;
            assert!((0.0..=1.0).contains(&score), "score {score} out of bounds");
        }
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // 1/8 = 12.5% rounds to 13
        let score = jaccard_overlap(&ids(&[1]), &ids(&[1, 2, 3, 4, 5, 6, 7, 8]));
        assert_eq!(score.percentage, 13);
    }

    #[test]
    fn test_combined_weights_both_components() {
        // skills 1/3, categories 1/1: 0.6 * (1/3) + 0.4 * 1.0 = 0.6
        let combined = combined_score(&ids(&[1, 2]), &ids(&[2, 3]), &ids(&[10]), &ids(&[10]));
        assert!((combined.score - 0.6).abs() < 1e-9);
        assert_eq!(combined.percentage, 60);
        assert!((combined.skills.score - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(combined.categories.score, 1.0);
    }

    #[test]
    fn test_combined_renormalizes_without_categories() {
        // no category ids anywhere: skill overlap carries the whole score
        let combined = combined_score(&ids(&[1, 2, 3]), &ids(&[1, 2]), &ids(&[]), &ids(&[]));
        assert!((combined.score - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(combined.percentage, 67);
    }

    #[test]
    fn test_combined_renormalizes_without_skills() {
        let combined = combined_score(&ids(&[]), &ids(&[]), &ids(&[10, 20]), &ids(&[10]));
        assert!((combined.score - 0.5).abs() < 1e-9);
        assert_eq!(combined.percentage, 50);
    }

    #[test]
    fn test_combined_no_signal_at_all_is_zero() {
        let combined = combined_score(&ids(&[]), &ids(&[]), &ids(&[]), &ids(&[]));
        assert_eq!(combined.score, 0.0);
        assert_eq!(combined.percentage, 0);
        assert!(!combined.score.is_nan());
    }

    #[test]
    fn test_combined_one_sided_category_set_still_participates() {
        // the user declared interests but the project has none: the category
        // component applies with score zero
        let combined = combined_score(&ids(&[1]), &ids(&[1]), &ids(&[10]), &ids(&[]));
        assert!((combined.score - 0.6).abs() < 1e-9);
        assert_eq!(combined.percentage, 60);
    }
}
