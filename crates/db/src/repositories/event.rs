//! Event repository.

use std::sync::Arc;

use crate::entities::{Dish, Event, dish, event};
use dinner_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use tracing::debug;

/// Event repository for database operations.
#[derive(Clone)]
pub struct EventRepository {
    db: Arc<DatabaseConnection>,
}

impl EventRepository {
    /// Create a new event repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an event by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<event::Model>> {
        Event::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an event by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<event::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::EventNotFound(id.to_string()))
    }

    /// List events visible in an ownership scope, newest first.
    ///
    /// `Some(owner)` lists that owner's events; `None` lists ownerless events.
    pub async fn find_by_owner(&self, owner_id: Option<&str>) -> AppResult<Vec<event::Model>> {
        let query = match owner_id {
            Some(id) => Event::find().filter(event::Column::UserId.eq(id)),
            None => Event::find().filter(event::Column::UserId.is_null()),
        };

        query
            .order_by_desc(event::Column::CreatedAt)
            .order_by_desc(event::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert an event together with its dishes in a single transaction.
    ///
    /// Either the event and every dish are stored, or nothing is.
    pub async fn create_with_dishes(
        &self,
        event: event::ActiveModel,
        dishes: Vec<dish::ActiveModel>,
    ) -> AppResult<event::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Dropping `txn` on an early return rolls back
        let created = event
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let dish_count = dishes.len();
        if !dishes.is_empty() {
            Dish::insert_many(dishes)
                .exec_without_returning(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        debug!(event_id = %created.id, dishes = dish_count, "Event stored");
        Ok(created)
    }

    /// Delete an event. Dishes and votes go with it through cascading foreign keys.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Event::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn create_test_event(id: &str, name: &str, user_id: Option<&str>) -> event::Model {
        event::Model {
            id: id.to_string(),
            name: name.to_string(),
            date: Utc::now().date_naive(),
            user_id: user_id.map(ToString::to_string),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<event::Model>::new()])
                .into_connection(),
        );

        let repo = EventRepository::new(db);
        let result = repo.get_by_id("missing").await;

        match result {
            Err(AppError::EventNotFound(id)) => assert_eq!(id, "missing"),
            other => panic!("Expected EventNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_find_by_owner() {
        let event1 = create_test_event("event2", "Friday", Some("user1"));
        let event2 = create_test_event("event1", "Monday", Some("user1"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[event1, event2]])
                .into_connection(),
        );

        let repo = EventRepository::new(db);
        let result = repo.find_by_owner(Some("user1")).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "Friday");
    }

    #[tokio::test]
    async fn test_create_with_dishes() {
        let event = create_test_event("event1", "Potluck", None);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[event.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );

        let repo = EventRepository::new(db);
        let dishes = ["Soup", "Pie"]
            .iter()
            .enumerate()
            .map(|(i, name)| dish::ActiveModel {
                id: Set(format!("dish{i}")),
                event_id: Set("event1".to_string()),
                name: Set((*name).to_string()),
                position: Set(i as i32),
            })
            .collect();

        let created = repo
            .create_with_dishes(event.clone().into(), dishes)
            .await
            .unwrap();

        assert_eq!(created, event);
    }
}
