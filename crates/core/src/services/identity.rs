//! Identity providers.
//!
//! An [`IdentityProvider`] turns some proof of identity into a signed-in
//! account. Two kinds exist:
//!
//! - [`PasswordProvider`] checks an email and password against the stored hash.
//! - [`FederatedProvider`] exchanges a third-party access token for the
//!   provider's user-info document and provisions an account keyed by email.

use std::sync::Arc;

use async_trait::async_trait;
use dinner_common::{AppError, AppResult, config::FederatedProviderConfig};
use dinner_db::entities::user;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::account::{AccountService, PROVIDER_CREDENTIALS};

/// A way of establishing who the caller is.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Proof of identity accepted by this provider.
    type Credentials: Send;

    /// Provider kind, as stored on the accounts it signs in.
    fn name(&self) -> &str;

    /// Resolve credentials into an account with a live session token.
    async fn authenticate(&self, credentials: Self::Credentials) -> AppResult<user::Model>;
}

/// Email and password.
#[derive(Debug, Deserialize)]
pub struct PasswordCredentials {
    pub email: String,
    pub password: String,
}

/// Access token issued by a third-party identity provider.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedCredentials {
    pub access_token: String,
}

/// Password sign-in against locally registered accounts.
#[derive(Clone)]
pub struct PasswordProvider {
    accounts: AccountService,
}

impl PasswordProvider {
    /// Create a password provider.
    #[must_use]
    pub const fn new(accounts: AccountService) -> Self {
        Self { accounts }
    }
}

#[async_trait]
impl IdentityProvider for PasswordProvider {
    type Credentials = PasswordCredentials;

    fn name(&self) -> &str {
        PROVIDER_CREDENTIALS
    }

    async fn authenticate(&self, credentials: PasswordCredentials) -> AppResult<user::Model> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            return Err(AppError::Unauthorized);
        }

        self.accounts
            .verify_credentials(&credentials.email, &credentials.password)
            .await
    }
}

/// Profile returned by a provider's `OpenID` Connect user-info endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FederatedProfile {
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Exchanges an access token for the profile it was issued to.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Fetch the profile behind an access token.
    ///
    /// A token the provider refuses yields [`AppError::Unauthorized`]; an
    /// unreachable or misbehaving provider yields [`AppError::ExternalService`].
    async fn fetch_profile(&self, access_token: &str) -> AppResult<FederatedProfile>;
}

/// [`IdentityVerifier`] backed by an HTTP user-info endpoint.
#[derive(Clone)]
pub struct UserInfoVerifier {
    http_client: reqwest::Client,
    userinfo_url: Url,
}

impl UserInfoVerifier {
    /// Create a verifier for a user-info endpoint.
    #[must_use]
    pub fn new(userinfo_url: Url) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            userinfo_url,
        }
    }
}

#[async_trait]
impl IdentityVerifier for UserInfoVerifier {
    async fn fetch_profile(&self, access_token: &str) -> AppResult<FederatedProfile> {
        let response = self
            .http_client
            .get(self.userinfo_url.clone())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("User-info request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            debug!(%status, url = %self.userinfo_url, "Access token rejected");
            return Err(AppError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "User-info endpoint error: {status} - {body}"
            )));
        }

        response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse user-info response: {e}"))
        })
    }
}

/// Sign-in through a third-party identity provider.
#[derive(Clone)]
pub struct FederatedProvider {
    name: String,
    verifier: Arc<dyn IdentityVerifier>,
    accounts: AccountService,
}

impl FederatedProvider {
    /// Create a federated provider with a custom verifier.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        verifier: Arc<dyn IdentityVerifier>,
        accounts: AccountService,
    ) -> Self {
        Self {
            name: name.into(),
            verifier,
            accounts,
        }
    }

    /// Create a provider from configuration, verifying tokens over HTTP.
    #[must_use]
    pub fn from_config(config: &FederatedProviderConfig, accounts: AccountService) -> Self {
        Self::new(
            config.name.clone(),
            Arc::new(UserInfoVerifier::new(config.userinfo_url.clone())),
            accounts,
        )
    }
}

#[async_trait]
impl IdentityProvider for FederatedProvider {
    type Credentials = FederatedCredentials;

    fn name(&self) -> &str {
        &self.name
    }

    async fn authenticate(&self, credentials: FederatedCredentials) -> AppResult<user::Model> {
        if credentials.access_token.is_empty() {
            return Err(AppError::Unauthorized);
        }

        let profile = self.verifier.fetch_profile(&credentials.access_token).await?;

        if profile.email_verified == Some(false) {
            warn!(provider = %self.name, "Rejected profile with unverified email");
            return Err(AppError::Unauthorized);
        }

        let email = profile
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or(AppError::Unauthorized)?;

        self.accounts
            .find_or_provision(&self.name, email, &profile)
            .await
    }
}
