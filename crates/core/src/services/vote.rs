//! Vote service.

use std::collections::HashSet;

use chrono::Utc;
use dinner_common::{AppError, AppResult, IdGenerator, config::VotingConfig};
use dinner_db::{
    entities::vote,
    repositories::{DishRepository, VoteRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

/// Vote service for business logic.
#[derive(Clone)]
pub struct VoteService {
    dish_repo: DishRepository,
    vote_repo: VoteRepository,
    id_gen: IdGenerator,
    voting: VotingConfig,
}

/// One rating for one dish.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteInput {
    pub dish_id: String,
    pub rating: i32,
}

/// A voter's ratings, submitted together.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVotesInput {
    #[validate(length(min = 1, max = 128))]
    pub user_name: String,

    pub votes: Vec<VoteInput>,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub fn new(dish_repo: DishRepository, vote_repo: VoteRepository, voting: &VotingConfig) -> Self {
        Self {
            dish_repo,
            vote_repo,
            id_gen: IdGenerator::new(),
            voting: voting.clone(),
        }
    }

    /// Store a voter's ratings in one batch. Returns the number of votes written.
    ///
    /// An empty list is accepted and writes nothing. Every referenced dish must
    /// exist. Ratings are only range-checked when `voting.enforce_rating_range`
    /// is enabled.
    pub async fn submit(&self, input: SubmitVotesInput) -> AppResult<u64> {
        input.validate()?;

        let user_name = input.user_name.trim();
        if user_name.is_empty() {
            return Err(AppError::Validation("Voter name must not be blank".to_string()));
        }

        if self.voting.enforce_rating_range {
            let (min, max) = (self.voting.min_rating, self.voting.max_rating);
            if let Some(bad) = input.votes.iter().find(|v| !(min..=max).contains(&v.rating)) {
                return Err(AppError::Validation(format!(
                    "Rating {} is outside {min}..={max}",
                    bad.rating
                )));
            }
        }

        if input.votes.is_empty() {
            return Ok(0);
        }

        self.ensure_dishes_exist(&input.votes).await?;

        let now = Utc::now();
        let models = input
            .votes
            .iter()
            .map(|v| vote::ActiveModel {
                id: Set(self.id_gen.generate()),
                dish_id: Set(v.dish_id.clone()),
                user_name: Set(user_name.to_string()),
                rating: Set(v.rating),
                created_at: Set(now.into()),
            })
            .collect();

        let written = self.vote_repo.create_many(models).await?;
        info!(votes = written, "Votes recorded");

        Ok(written)
    }

    async fn ensure_dishes_exist(&self, votes: &[VoteInput]) -> AppResult<()> {
        let requested: HashSet<&str> = votes.iter().map(|v| v.dish_id.as_str()).collect();
        let ids: Vec<String> = requested.iter().map(ToString::to_string).collect();

        let found: HashSet<String> = self
            .dish_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|d| d.id)
            .collect();

        match requested.iter().find(|id| !found.contains(**id)) {
            Some(missing) => Err(AppError::Validation(format!("Unknown dish: {missing}"))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use dinner_db::entities::dish;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn service(db: DatabaseConnection, voting: &VotingConfig) -> VoteService {
        let db = Arc::new(db);
        VoteService::new(
            DishRepository::new(Arc::clone(&db)),
            VoteRepository::new(db),
            voting,
        )
    }

    fn create_test_dish(id: &str) -> dish::Model {
        dish::Model {
            id: id.to_string(),
            event_id: "event1".to_string(),
            name: "Gumbo".to_string(),
            position: 0,
        }
    }

    fn input(user_name: &str, votes: &[(&str, i32)]) -> SubmitVotesInput {
        SubmitVotesInput {
            user_name: user_name.to_string(),
            votes: votes
                .iter()
                .map(|(dish_id, rating)| VoteInput {
                    dish_id: (*dish_id).to_string(),
                    rating: *rating,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_empty_votes_write_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let written = service(db, &VotingConfig::default())
            .submit(input("alice", &[]))
            .await
            .unwrap();

        assert_eq!(written, 0);
    }

    #[tokio::test]
    async fn test_blank_voter_name_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db, &VotingConfig::default())
            .submit(input("  ", &[("d1", 5)]))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unknown_dish_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_dish("d1")]])
            .into_connection();

        let result = service(db, &VotingConfig::default())
            .submit(input("alice", &[("d1", 5), ("ghost", 7)]))
            .await;

        assert!(matches!(result, Err(AppError::Validation(msg)) if msg.contains("ghost")));
    }

    #[tokio::test]
    async fn test_out_of_range_rating_accepted_by_default() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_dish("d1")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let written = service(db, &VotingConfig::default())
            .submit(input("alice", &[("d1", 11)]))
            .await
            .unwrap();

        assert_eq!(written, 1);
    }

    #[tokio::test]
    async fn test_out_of_range_rating_rejected_when_enforced() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let voting = VotingConfig {
            enforce_rating_range: true,
            ..VotingConfig::default()
        };

        let result = service(db, &voting)
            .submit(input("alice", &[("d1", 0)]))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
