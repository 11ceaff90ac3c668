//! API endpoints.

mod auth;
mod events;
mod votes;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/events", events::router())
        .merge(votes::router())
        .merge(auth::router())
}
