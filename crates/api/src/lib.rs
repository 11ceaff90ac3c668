//! HTTP API layer for dinner-rater.
//!
//! - **Endpoints**: events, votes and account/session routes
//! - **Extractors**: authenticated caller, JSON bodies with uniform errors
//! - **Middleware**: bearer-token authentication
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

use axum::{Router, routing::get};

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};

/// Full application: the API under `/api`, a `/health` probe, and bearer-token
/// authentication on every route.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
