//! Dish repository.

use std::sync::Arc;

use crate::entities::{Dish, dish};
use dinner_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Dish repository for database operations.
#[derive(Clone)]
pub struct DishRepository {
    db: Arc<DatabaseConnection>,
}

impl DishRepository {
    /// Create a new dish repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Get an event's dishes in the order they were submitted.
    pub async fn find_by_event(&self, event_id: &str) -> AppResult<Vec<dish::Model>> {
        Dish::find()
            .filter(dish::Column::EventId.eq(event_id))
            .order_by_asc(dish::Column::Position)
            .order_by_asc(dish::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find dishes by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<dish::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Dish::find()
            .filter(dish::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_dish(id: &str, event_id: &str, name: &str, position: i32) -> dish::Model {
        dish::Model {
            id: id.to_string(),
            event_id: event_id.to_string(),
            name: name.to_string(),
            position,
        }
    }

    #[tokio::test]
    async fn test_find_by_event() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_dish("dish1", "event1", "Lasagna", 0),
                    create_test_dish("dish2", "event1", "Tiramisu", 1),
                ]])
                .into_connection(),
        );

        let repo = DishRepository::new(db);
        let dishes = repo.find_by_event("event1").await.unwrap();

        assert_eq!(dishes.len(), 2);
        assert_eq!(dishes[1].name, "Tiramisu");
    }

    #[tokio::test]
    async fn test_find_by_ids_empty_skips_query() {
        // No query results queued: hitting the database would fail
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = DishRepository::new(db);
        let dishes = repo.find_by_ids(&[]).await.unwrap();

        assert!(dishes.is_empty());
    }
}
