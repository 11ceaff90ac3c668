//! Event service.

use std::collections::HashMap;

use chrono::Utc;
use dinner_common::{AppError, AppResult, IdGenerator};
use dinner_db::{
    entities::{dish, event},
    repositories::{DishRepository, EventRepository, VoteRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::ranking::{DishStatistic, Highlights, Ranking};

/// Longest accepted dish name, matching the `dish.name` column.
const MAX_DISH_NAME_LEN: usize = 256;

/// Event service for business logic.
#[derive(Clone)]
pub struct EventService {
    event_repo: EventRepository,
    dish_repo: DishRepository,
    vote_repo: VoteRepository,
    id_gen: IdGenerator,
}

/// Input for creating an event.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventInput {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    /// Dish names in display order.
    #[validate(length(min = 1))]
    pub dishes: Vec<String>,
}

/// A single vote as shown on the event page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSummary {
    pub user_name: String,
    pub rating: i32,
}

/// Dish statistics together with the votes behind them.
#[derive(Debug, Clone, Serialize)]
pub struct DishDetail {
    #[serde(flatten)]
    pub statistic: DishStatistic,
    pub votes: Vec<VoteSummary>,
}

/// Everything shown on an event's page.
#[derive(Debug, Clone, Serialize)]
pub struct EventDetail {
    pub event: event::Model,
    /// Dishes ranked by descending average rating.
    pub dishes: Vec<DishDetail>,
    pub highlights: Highlights,
}

impl EventService {
    /// Create a new event service.
    #[must_use]
    pub const fn new(
        event_repo: EventRepository,
        dish_repo: DishRepository,
        vote_repo: VoteRepository,
    ) -> Self {
        Self {
            event_repo,
            dish_repo,
            vote_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List the events visible to a caller, newest first.
    ///
    /// Signed-in callers see the events they own, anonymous callers see
    /// events without an owner.
    pub async fn list(&self, owner_id: Option<&str>) -> AppResult<Vec<event::Model>> {
        self.event_repo.find_by_owner(owner_id).await
    }

    /// Create an event and its dishes atomically, dated today (UTC).
    pub async fn create(
        &self,
        input: CreateEventInput,
        owner_id: Option<&str>,
    ) -> AppResult<event::Model> {
        input.validate()?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Event name must not be blank".to_string()));
        }
        if input.dishes.iter().any(|d| d.trim().is_empty()) {
            return Err(AppError::Validation("Dish names must not be blank".to_string()));
        }
        if input.dishes.iter().any(|d| d.trim().chars().count() > MAX_DISH_NAME_LEN) {
            return Err(AppError::Validation(format!(
                "Dish names must be at most {MAX_DISH_NAME_LEN} characters"
            )));
        }

        let now = Utc::now();
        let event_id = self.id_gen.generate();

        let event_model = event::ActiveModel {
            id: Set(event_id.clone()),
            name: Set(name.to_string()),
            date: Set(now.date_naive()),
            user_id: Set(owner_id.map(ToString::to_string)),
            created_at: Set(now.into()),
        };

        let dish_models = input
            .dishes
            .iter()
            .enumerate()
            .map(|(position, dish_name)| dish::ActiveModel {
                id: Set(self.id_gen.generate()),
                event_id: Set(event_id.clone()),
                name: Set(dish_name.trim().to_string()),
                position: Set(position as i32),
            })
            .collect();

        let event = self
            .event_repo
            .create_with_dishes(event_model, dish_models)
            .await?;

        info!(
            event_id = %event.id,
            dishes = input.dishes.len(),
            owned = owner_id.is_some(),
            "Event created"
        );

        Ok(event)
    }

    /// Load an event with its ranked dishes, their votes and the highlights.
    pub async fn detail(&self, id: &str) -> AppResult<EventDetail> {
        let event = self.event_repo.get_by_id(id).await?;
        let dishes = self.dish_repo.find_by_event(&event.id).await?;
        let votes = self.vote_repo.find_by_event(&event.id).await?;

        let Ranking {
            statistics,
            highlights,
        } = Ranking::compute(&dishes, &votes);

        let mut votes_by_dish: HashMap<String, Vec<VoteSummary>> = HashMap::new();
        for vote in votes {
            votes_by_dish
                .entry(vote.dish_id)
                .or_default()
                .push(VoteSummary {
                    user_name: vote.user_name,
                    rating: vote.rating,
                });
        }

        let dishes = statistics
            .into_iter()
            .map(|statistic| {
                let votes = votes_by_dish.remove(&statistic.dish_id).unwrap_or_default();
                DishDetail { statistic, votes }
            })
            .collect();

        Ok(EventDetail {
            event,
            dishes,
            highlights,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use dinner_db::entities::vote;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> EventService {
        let db = Arc::new(db);
        EventService::new(
            EventRepository::new(Arc::clone(&db)),
            DishRepository::new(Arc::clone(&db)),
            VoteRepository::new(db),
        )
    }

    fn empty_service() -> EventService {
        service(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn create_test_event(id: &str) -> event::Model {
        event::Model {
            id: id.to_string(),
            name: "Sunday roast".to_string(),
            date: Utc::now().date_naive(),
            user_id: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_vote(id: &str, dish_id: &str, user_name: &str, rating: i32) -> vote::Model {
        vote::Model {
            id: id.to_string(),
            dish_id: dish_id.to_string(),
            user_name: user_name.to_string(),
            rating,
            created_at: Utc::now().into(),
        }
    }

    fn input(name: &str, dishes: &[&str]) -> CreateEventInput {
        CreateEventInput {
            name: name.to_string(),
            dishes: dishes.iter().map(ToString::to_string).collect(),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_empty_dish_list() {
        let result = empty_service().create(input("Potluck", &[]), None).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_names() {
        let service = empty_service();

        let result = service.create(input("   ", &["Soup"]), None).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = service.create(input("Potluck", &["Soup", " "]), None).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_returns_stored_event() {
        let stored = create_test_event("event1");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_connection();

        let event = service(db)
            .create(input("Sunday roast", &["Beef", "Yorkshire pudding"]), None)
            .await
            .unwrap();

        assert_eq!(event, stored);
    }

    #[tokio::test]
    async fn test_detail_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<event::Model>::new()])
            .into_connection();

        let result = service(db).detail("missing").await;

        assert!(matches!(result, Err(AppError::EventNotFound(id)) if id == "missing"));
    }

    #[tokio::test]
    async fn test_detail_ranks_dishes_and_groups_votes() {
        let dishes = vec![
            dish::Model {
                id: "d1".to_string(),
                event_id: "event1".to_string(),
                name: "Beef".to_string(),
                position: 0,
            },
            dish::Model {
                id: "d2".to_string(),
                event_id: "event1".to_string(),
                name: "Pudding".to_string(),
                position: 1,
            },
        ];
        let votes = vec![
            create_test_vote("v1", "d1", "alice", 4),
            create_test_vote("v2", "d2", "alice", 9),
            create_test_vote("v3", "d2", "bob", 7),
        ];

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_event("event1")]])
            .append_query_results([dishes])
            .append_query_results([votes])
            .into_connection();

        let detail = service(db).detail("event1").await.unwrap();

        assert_eq!(detail.dishes[0].statistic.dish_id, "d2");
        assert_eq!(detail.dishes[0].statistic.average_rating, 8.0);
        assert_eq!(
            detail.dishes[0].votes,
            [
                VoteSummary {
                    user_name: "alice".to_string(),
                    rating: 9
                },
                VoteSummary {
                    user_name: "bob".to_string(),
                    rating: 7
                },
            ]
        );
        assert_eq!(detail.dishes[1].votes.len(), 1);
        assert_eq!(detail.highlights.winner.unwrap().dish_id, "d2");
        assert_eq!(detail.highlights.loser.unwrap().dish_id, "d1");
    }
}
