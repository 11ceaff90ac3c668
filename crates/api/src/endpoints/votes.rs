//! Vote endpoints.

use axum::{Router, extract::State, routing::post};
use dinner_common::AppResult;
use dinner_core::SubmitVotesInput;

use crate::{
    extractors::JsonBody,
    middleware::AppState,
    response::{ApiResponse, SuccessResponse},
};

/// Record a voter's ratings.
async fn submit(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<SubmitVotesInput>,
) -> AppResult<ApiResponse<SuccessResponse>> {
    state.vote_service.submit(input).await?;

    Ok(ApiResponse::ok(SuccessResponse::new()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/vote", post(submit))
}
