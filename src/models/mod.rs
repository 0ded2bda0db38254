use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt::Display};

pub type UserId = i64;
pub type ProjectId = i64;
pub type SkillId = i64;
pub type CategoryId = i64;

// ============================================================================
// Domain Types
// ============================================================================

/// A volunteer's matching profile: the skills they offer and the project
/// categories they are interested in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: UserId,
    pub skill_ids: HashSet<SkillId>,
    pub interest_category_ids: HashSet<CategoryId>,
}

/// Lifecycle state of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Draft,
    Published,
    InProgress,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    /// Whether the project is still taking on new members
    pub fn is_recruitable(self) -> bool {
        matches!(self, ProjectStatus::Published | ProjectStatus::InProgress)
    }

    /// Parses the database representation; `None` for unrecognized values
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(ProjectStatus::Draft),
            "published" => Some(ProjectStatus::Published),
            "in_progress" => Some(ProjectStatus::InProgress),
            "completed" => Some(ProjectStatus::Completed),
            "cancelled" => Some(ProjectStatus::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::Published => "published",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }
}

impl Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the requesting user is already attached to a project, if at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affiliation {
    Creator,
    Mentor,
    Volunteer,
}

/// One skill a project asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredSkill {
    pub skill_id: SkillId,
    pub mandatory: bool,
}

/// A project as loaded for scoring, before any filtering
#[derive(Debug, Clone)]
pub struct CandidateProject {
    pub id: ProjectId,
    pub name: String,
    pub status: ProjectStatus,
    pub required_skills: Vec<RequiredSkill>,
    pub category_ids: HashSet<CategoryId>,
    /// Set when the requesting user already belongs to the project
    pub requester_affiliation: Option<Affiliation>,
}

impl CandidateProject {
    pub fn required_skill_ids(&self) -> HashSet<SkillId> {
        self.required_skills.iter().map(|s| s.skill_id).collect()
    }
}

// ============================================================================
// API Response Types
// ============================================================================

/// Compact project view embedded in each recommendation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub name: String,
    pub status: ProjectStatus,
    pub category_ids: Vec<CategoryId>,
}

impl From<&CandidateProject> for ProjectSummary {
    fn from(project: &CandidateProject) -> Self {
        let mut category_ids: Vec<CategoryId> = project.category_ids.iter().copied().collect();
        category_ids.sort_unstable();

        ProjectSummary {
            id: project.id,
            name: project.name.clone(),
            status: project.status,
            category_ids,
        }
    }
}

/// A scored project returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResult {
    pub project_id: ProjectId,
    pub project_name: String,
    /// Combined similarity in [0.0, 1.0]
    pub score: f64,
    /// Combined similarity as a whole percentage; thresholds compare against this
    pub percentage: u32,
    pub skills_score: f64,
    pub interests_score: f64,
    pub matching_skill_count: usize,
    pub project_skill_count: usize,
    /// Names of the overlapping skills, ordered by skill id
    pub matching_skills: Vec<String>,
    pub project: ProjectSummary,
}

/// Envelope for `GET /users/:user_id/recommendations`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RecommendationsResponse {
    pub user_id: UserId,
    pub total: usize,
    pub results: Vec<RecommendationResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_status_serde() {
        let json = serde_json::to_string(&ProjectStatus::InProgress).unwrap();
        assert_eq!(json, r#""in_progress""#);

        let deserialized: ProjectStatus = serde_json::from_str(r#""published""#).unwrap();
        assert_eq!(deserialized, ProjectStatus::Published);
    }

    #[test]
    fn test_project_status_parse_round_trips() {
        for status in [
            ProjectStatus::Draft,
            ProjectStatus::Published,
            ProjectStatus::InProgress,
            ProjectStatus::Completed,
            ProjectStatus::Cancelled,
        ] {
            assert_eq!(ProjectStatus::parse(status.as_str()), Some(status));
        }

        assert_eq!(ProjectStatus::parse("archived"), None);
    }

    #[test]
    fn test_only_published_and_in_progress_are_recruitable() {
        assert!(ProjectStatus::Published.is_recruitable());
        assert!(ProjectStatus::InProgress.is_recruitable());

        assert!(!ProjectStatus::Draft.is_recruitable());
        assert!(!ProjectStatus::Completed.is_recruitable());
        assert!(!ProjectStatus::Cancelled.is_recruitable());
    }

    #[test]
    fn test_affiliation_serde() {
        let json = serde_json::to_string(&Affiliation::Creator).unwrap();
        assert_eq!(json, r#""creator""#);

        let deserialized: Affiliation = serde_json::from_str(r#""mentor""#).unwrap();
        assert_eq!(deserialized, Affiliation::Mentor);
    }

    #[test]
    fn test_project_summary_sorts_category_ids() {
        let project = CandidateProject {
            id: 7,
            name: "Community Garden Tracker".to_string(),
            status: ProjectStatus::Published,
            required_skills: vec![],
            category_ids: HashSet::from([30, 10, 20]),
            requester_affiliation: None,
        };

        let summary = ProjectSummary::from(&project);
        assert_eq!(summary.category_ids, vec![10, 20, 30]);
        assert_eq!(summary.id, 7);
        assert_eq!(summary.status, ProjectStatus::Published);
    }

    #[test]
    fn test_required_skill_ids_collects_ids() {
        let project = CandidateProject {
            id: 1,
            name: "Food Bank Portal".to_string(),
            status: ProjectStatus::Published,
            required_skills: vec![
                RequiredSkill {
                    skill_id: 4,
                    mandatory: true,
                },
                RequiredSkill {
                    skill_id: 9,
                    mandatory: false,
                },
            ],
            category_ids: HashSet::new(),
            requester_affiliation: None,
        };

        assert_eq!(project.required_skill_ids(), HashSet::from([4, 9]));
    }
}
