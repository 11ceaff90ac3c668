//! API middleware.

#![allow(missing_docs)]

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use dinner_common::Config;
use dinner_core::{
    AccountService, EventService, FederatedProvider, IdentityProvider, PasswordProvider,
    VoteService,
};
use dinner_db::repositories::{DishRepository, EventRepository, UserRepository, VoteRepository};
use sea_orm::DatabaseConnection;
use tracing::debug;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub event_service: EventService,
    pub vote_service: VoteService,
    pub account_service: AccountService,
    pub password_provider: PasswordProvider,
    /// Federated identity providers by name.
    pub federated_providers: Arc<HashMap<String, FederatedProvider>>,
}

impl AppState {
    /// Wire repositories and services over a shared connection.
    #[must_use]
    pub fn new(db: &Arc<DatabaseConnection>, config: &Config) -> Self {
        let user_repo = UserRepository::new(Arc::clone(db));
        let event_repo = EventRepository::new(Arc::clone(db));
        let dish_repo = DishRepository::new(Arc::clone(db));
        let vote_repo = VoteRepository::new(Arc::clone(db));

        let account_service = AccountService::new(user_repo);
        let event_service = EventService::new(event_repo, dish_repo.clone(), vote_repo.clone());
        let vote_service = VoteService::new(dish_repo, vote_repo, &config.voting);

        let federated_providers = config
            .auth
            .federated
            .iter()
            .map(|provider| {
                (
                    provider.name.clone(),
                    FederatedProvider::from_config(provider, account_service.clone()),
                )
            })
            .collect();

        Self {
            event_service,
            vote_service,
            password_provider: PasswordProvider::new(account_service.clone()),
            account_service,
            federated_providers: Arc::new(federated_providers),
        }
    }

    /// Register (or replace) a federated identity provider.
    #[must_use]
    pub fn with_federated_provider(mut self, provider: FederatedProvider) -> Self {
        Arc::make_mut(&mut self.federated_providers).insert(provider.name().to_string(), provider);
        self
    }
}

/// Authentication middleware.
///
/// Resolves `Authorization: Bearer <token>` into the signed-in account and
/// stores it in the request extensions. Unknown tokens leave the request
/// anonymous; routes that need a caller reject it through [`crate::extractors::AuthUser`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.account_service.authenticate_by_token(token.trim()).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => debug!(error = %e, "Bearer token not accepted"),
        }
    }

    next.run(req).await
}
