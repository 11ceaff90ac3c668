//! Account and session endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use dinner_common::{AppError, AppResult};
use dinner_core::{FederatedCredentials, IdentityProvider, PasswordCredentials, RegisterInput};
use dinner_db::entities::user;
use serde::Serialize;

use crate::{
    extractors::{AuthUser, JsonBody, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, SuccessResponse},
};

/// Signed-in account with its session token.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub token: String,
}

impl TryFrom<user::Model> for SigninResponse {
    type Error = AppError;

    fn try_from(user: user::Model) -> AppResult<Self> {
        let token = user
            .token
            .ok_or_else(|| AppError::Internal(format!("User {} has no session token", user.id)))?;

        Ok(Self {
            id: user.id,
            email: user.email,
            name: user.name,
            token,
        })
    }
}

/// Public account details.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub provider: String,
}

impl From<user::Model> for SessionUser {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            image: user.image,
            provider: user.provider,
        }
    }
}

/// Current session.
#[derive(Serialize)]
pub struct SessionResponse {
    pub user: Option<SessionUser>,
}

/// Signout response.
#[derive(Serialize)]
pub struct SignoutResponse {
    pub ok: bool,
}

/// Create a password account.
async fn register(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<RegisterInput>,
) -> AppResult<ApiResponse<SuccessResponse>> {
    state.account_service.register(input).await?;

    Ok(ApiResponse::created(SuccessResponse::new()))
}

/// Sign in with email and password.
async fn signin(
    State(state): State<AppState>,
    JsonBody(credentials): JsonBody<PasswordCredentials>,
) -> AppResult<ApiResponse<SigninResponse>> {
    let user = state.password_provider.authenticate(credentials).await?;

    Ok(ApiResponse::ok(user.try_into()?))
}

/// Sign in with an access token from a federated identity provider.
async fn federated_signin(
    Path(provider): Path<String>,
    State(state): State<AppState>,
    JsonBody(credentials): JsonBody<FederatedCredentials>,
) -> AppResult<ApiResponse<SigninResponse>> {
    let provider = state
        .federated_providers
        .get(&provider)
        .ok_or_else(|| AppError::NotFound(format!("Identity provider {provider}")))?;

    let user = provider.authenticate(credentials).await?;

    Ok(ApiResponse::ok(user.try_into()?))
}

/// Sign out (invalidate current token by replacing it).
async fn signout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<SignoutResponse>> {
    state.account_service.sign_out(user).await?;

    Ok(ApiResponse::ok(SignoutResponse { ok: true }))
}

/// Show who is signed in.
async fn session(caller: MaybeAuthUser) -> ApiResponse<SessionResponse> {
    ApiResponse::ok(SessionResponse {
        user: caller.0.map(SessionUser::from),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/auth/signin", post(signin))
        .route("/auth/federated/{provider}", post(federated_signin))
        .route("/auth/signout", post(signout))
        .route("/auth/session", get(session))
}
