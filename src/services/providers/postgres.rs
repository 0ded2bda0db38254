use std::collections::{HashMap, HashSet};

use sqlx::PgPool;
use tracing::warn;

use crate::{
    error::AppResult,
    models::{
        Affiliation, CandidateProject, CategoryId, ProjectStatus, RequiredSkill, SkillId, UserId,
        UserProfile,
    },
};

use super::RecommendationStore;

/// Postgres-backed [`RecommendationStore`]
///
/// Candidate queries pre-filter on facts that never need re-judging (the
/// user's own projects, closed statuses) and surface any remaining membership
/// as `requester_affiliation` for the engine to act on.
#[derive(Clone)]
pub struct PgRecommendationStore {
    pool: PgPool,
}

impl PgRecommendationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    id: i64,
    name: String,
    status: String,
    requester_role: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct ProjectSkillRow {
    project_id: i64,
    skill_id: i64,
    mandatory: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct ProjectCategoryRow {
    project_id: i64,
    category_id: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct SkillNameRow {
    id: i64,
    name: String,
}

#[async_trait::async_trait]
impl RecommendationStore for PgRecommendationStore {
    async fn user_profile(&self, user_id: UserId) -> AppResult<Option<UserProfile>> {
        let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        if exists.is_none() {
            return Ok(None);
        }

        let skill_ids =
            sqlx::query_scalar::<_, i64>("SELECT skill_id FROM user_skills WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        let interest_category_ids = sqlx::query_scalar::<_, i64>(
            "SELECT category_id FROM user_interests WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(UserProfile {
            user_id,
            skill_ids: skill_ids.into_iter().collect(),
            interest_category_ids: interest_category_ids.into_iter().collect(),
        }))
    }

    async fn candidate_projects(&self, user_id: UserId) -> AppResult<Vec<CandidateProject>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT p.id, p.name, p.status,
                   (SELECT pm.role
                      FROM project_members pm
                     WHERE pm.project_id = p.id
                       AND pm.user_id = $1
                       AND pm.status IN ('active', 'pending')
                     LIMIT 1) AS requester_role
              FROM projects p
             WHERE p.created_by <> $1
               AND p.status IN ('published', 'in_progress')
             ORDER BY p.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let project_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

        let skill_rows = sqlx::query_as::<_, ProjectSkillRow>(
            "SELECT project_id, skill_id, mandatory FROM project_skills WHERE project_id = ANY($1)",
        )
        .bind(&project_ids)
        .fetch_all(&self.pool)
        .await?;

        let category_rows = sqlx::query_as::<_, ProjectCategoryRow>(
            "SELECT project_id, category_id FROM project_categories WHERE project_id = ANY($1)",
        )
        .bind(&project_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut skills_by_project: HashMap<i64, Vec<RequiredSkill>> = HashMap::new();
        for row in skill_rows {
            skills_by_project
                .entry(row.project_id)
                .or_default()
                .push(RequiredSkill {
                    skill_id: row.skill_id,
                    mandatory: row.mandatory,
                });
        }

        let mut categories_by_project: HashMap<i64, HashSet<CategoryId>> = HashMap::new();
        for row in category_rows {
            categories_by_project
                .entry(row.project_id)
                .or_default()
                .insert(row.category_id);
        }

        let mut projects = Vec::with_capacity(rows.len());

        for row in rows {
            let status = match ProjectStatus::parse(&row.status) {
                Some(status) => status,
                None => {
                    warn!(
                        project_id = row.id,
                        status = %row.status,
                        "Unrecognized project status, skipping"
                    );
                    continue;
                }
            };

            projects.push(CandidateProject {
                id: row.id,
                name: row.name,
                status,
                required_skills: skills_by_project.remove(&row.id).unwrap_or_default(),
                category_ids: categories_by_project.remove(&row.id).unwrap_or_default(),
                requester_affiliation: row.requester_role.as_deref().map(parse_member_role),
            });
        }

        Ok(projects)
    }

    async fn skill_names(
        &self,
        skill_ids: &HashSet<SkillId>,
    ) -> AppResult<HashMap<SkillId, String>> {
        if skill_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<i64> = skill_ids.iter().copied().collect();

        let rows = sqlx::query_as::<_, SkillNameRow>("SELECT id, name FROM skills WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|row| (row.id, row.name)).collect())
    }
}

/// Maps a membership role column to an affiliation
///
/// Any membership blocks a recommendation, so an unrecognized role still maps
/// to an affiliated variant rather than dropping the signal.
fn parse_member_role(role: &str) -> Affiliation {
    match role {
        "mentor" => Affiliation::Mentor,
        "volunteer" => Affiliation::Volunteer,
        other => {
            warn!(role = %other, "Unrecognized membership role, treating as volunteer");
            Affiliation::Volunteer
        }
    }
}
