//! Event endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use chrono::{DateTime, FixedOffset, NaiveDate};
use dinner_common::AppResult;
use dinner_core::{CreateEventInput, DishDetail, EventDetail, Highlights};
use dinner_db::entities::event;
use serde::Serialize;

use crate::{
    extractors::{JsonBody, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Event response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

impl From<event::Model> for EventResponse {
    fn from(event: event::Model) -> Self {
        Self {
            id: event.id,
            name: event.name,
            date: event.date,
            user_id: event.user_id,
            created_at: event.created_at,
        }
    }
}

/// Created event response.
#[derive(Serialize)]
pub struct CreatedEventResponse {
    pub id: String,
}

/// Event page response.
#[derive(Serialize)]
pub struct EventDetailResponse {
    pub event: EventResponse,
    pub dishes: Vec<DishDetail>,
    pub highlights: Highlights,
}

impl From<EventDetail> for EventDetailResponse {
    fn from(detail: EventDetail) -> Self {
        Self {
            event: detail.event.into(),
            dishes: detail.dishes,
            highlights: detail.highlights,
        }
    }
}

/// List the caller's events (or ownerless ones when anonymous).
async fn list(
    caller: MaybeAuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<EventResponse>>> {
    let events = state.event_service.list(caller.id()).await?;

    Ok(ApiResponse::ok(
        events.into_iter().map(EventResponse::from).collect(),
    ))
}

/// Create an event with its dishes.
async fn create(
    caller: MaybeAuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateEventInput>,
) -> AppResult<ApiResponse<CreatedEventResponse>> {
    let event = state.event_service.create(input, caller.id()).await?;

    Ok(ApiResponse::created(CreatedEventResponse { id: event.id }))
}

/// Show an event with ranked dishes and highlights.
async fn show(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<EventDetailResponse>> {
    let detail = state.event_service.detail(&id).await?;

    Ok(ApiResponse::ok(detail.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show))
}
