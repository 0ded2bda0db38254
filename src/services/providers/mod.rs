//! Data source abstraction for the recommendation engine.
//!
//! The engine only ever reads through the [`RecommendationStore`] trait, so
//! the scoring pipeline can be exercised against in-memory fixtures while
//! production wires in Postgres.

use std::collections::{HashMap, HashSet};

use crate::{
    error::AppResult,
    models::{CandidateProject, SkillId, UserId, UserProfile},
};

pub mod postgres;

pub use postgres::PgRecommendationStore;

/// Read-side store for profiles, projects, and skill metadata
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationStore: Send + Sync {
    /// The user's skill and interest sets
    ///
    /// Returns `None` when no such user exists; an existing user with
    /// nothing on their profile returns `Some` with empty sets.
    async fn user_profile(&self, user_id: UserId) -> AppResult<Option<UserProfile>>;

    /// Projects the user could conceivably be matched with
    ///
    /// Implementations may pre-filter on cheap facts (own projects, closed
    /// statuses), but the engine re-checks every exclusion rule on whatever
    /// comes back.
    async fn candidate_projects(&self, user_id: UserId) -> AppResult<Vec<CandidateProject>>;

    /// Resolves skill ids to display names
    ///
    /// Ids with no matching row are simply absent from the returned map.
    async fn skill_names(&self, skill_ids: &HashSet<SkillId>)
        -> AppResult<HashMap<SkillId, String>>;
}
