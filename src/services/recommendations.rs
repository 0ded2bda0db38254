use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        CandidateProject, ProjectSummary, RecommendationResult, RecommendationsResponse, UserId,
    },
    services::providers::RecommendationStore,
    services::similarity::{combined_score, CombinedScore},
    services::similarity_log::{SimilarityLogRecord, SimilarityLogger},
};

/// Results returned when the caller does not ask for a specific count
pub const DEFAULT_LIMIT: usize = 10;

/// A candidate that survived the exclusion rules, with its scores
struct ScoredProject {
    project: CandidateProject,
    combined: CombinedScore,
}

/// Computes ranked project recommendations for a user
///
/// The pipeline is: load the user's profile, drop candidates the user may not
/// be matched with, score the rest by set overlap, apply the caller's
/// threshold, rank, and resolve skill names for the final page.
pub struct RecommendationService {
    store: Arc<dyn RecommendationStore>,
    logger: Option<SimilarityLogger>,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn RecommendationStore>, logger: Option<SimilarityLogger>) -> Self {
        Self { store, logger }
    }

    /// Returns the user's best-matching projects, best first
    ///
    /// Ordering is fully deterministic: descending combined score, ties
    /// broken by ascending project id. `min_similarity_percent` compares
    /// against the rounded percentage, so a project scoring 12.5% passes a
    /// threshold of 13.
    pub async fn get_recommendations(
        &self,
        user_id: UserId,
        limit: Option<u32>,
        min_similarity_percent: Option<u32>,
    ) -> AppResult<RecommendationsResponse> {
        let start = Instant::now();

        // 1. Validate parameters before touching the store
        if limit == Some(0) {
            return Err(AppError::InvalidInput(
                "Limit must be at least 1".to_string(),
            ));
        }

        if let Some(min) = min_similarity_percent {
            if min > 100 {
                return Err(AppError::InvalidInput(
                    "Minimum similarity must be between 0 and 100".to_string(),
                ));
            }
        }

        let limit = limit.map(|l| l as usize).unwrap_or(DEFAULT_LIMIT);

        // 2. Load the user's profile
        let profile = match self.store.user_profile(user_id).await? {
            Some(profile) => profile,
            None => {
                return Err(AppError::NotFound(format!("User {} not found", user_id)));
            }
        };

        let candidates = self.store.candidate_projects(user_id).await?;
        let candidates_considered = candidates.len();

        tracing::info!(
            user_id,
            skills = profile.skill_ids.len(),
            interests = profile.interest_category_ids.len(),
            candidates = candidates_considered,
            "Computing recommendations"
        );

        // 3. Drop excluded candidates and score the rest
        let mut scored: Vec<ScoredProject> = Vec::new();

        for project in candidates {
            if let Some(affiliation) = project.requester_affiliation {
                tracing::debug!(
                    project_id = project.id,
                    affiliation = ?affiliation,
                    "Skipping project the user already belongs to"
                );
                continue;
            }

            if !project.status.is_recruitable() {
                tracing::debug!(
                    project_id = project.id,
                    status = %project.status,
                    "Skipping project not open for recruitment"
                );
                continue;
            }

            let project_skills = project.required_skill_ids();
            let combined = combined_score(
                &profile.skill_ids,
                &project_skills,
                &profile.interest_category_ids,
                &project.category_ids,
            );

            scored.push(ScoredProject { project, combined });
        }

        let candidates_scored = scored.len();

        // 4. Apply the similarity threshold on rounded percentages
        if let Some(min) = min_similarity_percent {
            scored.retain(|entry| entry.combined.percentage >= min);
        }

        // 5. Rank best first, ties by project id, then take the page
        scored.sort_by(|a, b| {
            b.combined
                .score
                .total_cmp(&a.combined.score)
                .then_with(|| a.project.id.cmp(&b.project.id))
        });
        scored.truncate(limit);

        // 6. Resolve names for every skill the final page mentions
        let mut wanted_ids: HashSet<i64> = HashSet::new();
        for entry in &scored {
            wanted_ids.extend(entry.combined.skills.matching_ids.iter().copied());
        }

        let names = self.store.skill_names(&wanted_ids).await?;

        let results: Vec<RecommendationResult> = scored
            .iter()
            .map(|entry| {
                let matching_skills: Vec<String> = entry
                    .combined
                    .skills
                    .matching_ids
                    .iter()
                    .map(|id| names.get(id).cloned().unwrap_or_else(|| id.to_string()))
                    .collect();

                RecommendationResult {
                    project_id: entry.project.id,
                    project_name: entry.project.name.clone(),
                    score: entry.combined.score,
                    percentage: entry.combined.percentage,
                    skills_score: entry.combined.skills.score,
                    interests_score: entry.combined.categories.score,
                    matching_skill_count: entry.combined.skills.matching_count,
                    project_skill_count: entry.project.required_skills.len(),
                    matching_skills,
                    project: ProjectSummary::from(&entry.project),
                }
            })
            .collect();

        let elapsed_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            user_id,
            considered = candidates_considered,
            scored = candidates_scored,
            returned = results.len(),
            elapsed_ms,
            "Recommendations computed"
        );

        // 7. Hand the run off to the similarity log, if one is attached
        if let Some(logger) = &self.logger {
            logger.record(SimilarityLogRecord {
                entry_id: Uuid::new_v4(),
                user_id,
                candidates_considered,
                candidates_scored,
                results_returned: results.len(),
                top_percentage: results.first().map(|r| r.percentage),
                limit,
                min_similarity_percent,
                elapsed_ms,
                recorded_at: Utc::now(),
            });
        }

        Ok(RecommendationsResponse {
            user_id,
            total: results.len(),
            results,
        })
    }
}
