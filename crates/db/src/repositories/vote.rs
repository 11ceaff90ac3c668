//! Vote repository.

use std::sync::Arc;

use crate::entities::{Vote, dish, vote};
use dinner_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, TransactionTrait,
};

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Get every vote cast on the dishes of an event, oldest first.
    pub async fn find_by_event(&self, event_id: &str) -> AppResult<Vec<vote::Model>> {
        Vote::find()
            .join(JoinType::InnerJoin, vote::Relation::Dish.def())
            .filter(dish::Column::EventId.eq(event_id))
            .order_by_asc(vote::Column::CreatedAt)
            .order_by_asc(vote::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a batch of votes atomically. Returns the number of rows written.
    pub async fn create_many(&self, votes: Vec<vote::ActiveModel>) -> AppResult<u64> {
        if votes.is_empty() {
            return Ok(0);
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let rows = Vote::insert_many(votes)
            .exec_without_returning(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn create_test_vote(id: &str, dish_id: &str, user_name: &str, rating: i32) -> vote::Model {
        vote::Model {
            id: id.to_string(),
            dish_id: dish_id.to_string(),
            user_name: user_name.to_string(),
            rating,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_event() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_vote("vote1", "dish1", "Ana", 8),
                    create_test_vote("vote2", "dish2", "Ana", 3),
                ]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let votes = repo.find_by_event("event1").await.unwrap();

        assert_eq!(votes.len(), 2);
        assert_eq!(votes[0].rating, 8);
    }

    #[tokio::test]
    async fn test_create_many() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let votes = vec![
            vote::ActiveModel {
                id: Set("vote1".to_string()),
                dish_id: Set("dish1".to_string()),
                user_name: Set("Ana".to_string()),
                rating: Set(7),
                created_at: Set(Utc::now().into()),
            },
            vote::ActiveModel {
                id: Set("vote2".to_string()),
                dish_id: Set("dish1".to_string()),
                user_name: Set("Ana".to_string()),
                rating: Set(9),
                created_at: Set(Utc::now().into()),
            },
        ];

        let rows = repo.create_many(votes).await.unwrap();
        assert_eq!(rows, 2);
    }

    #[tokio::test]
    async fn test_create_many_empty() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = VoteRepository::new(db);
        assert_eq!(repo.create_many(vec![]).await.unwrap(), 0);
    }
}
