//! Account service.
//!
//! Registration, session tokens and account provisioning for federated
//! sign-in. Passwords are stored as salted Argon2 hashes.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use dinner_common::{AppError, AppResult, IdGenerator};
use dinner_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use super::identity::FederatedProfile;

/// Provider kind stored on accounts that sign in with a password.
pub const PROVIDER_CREDENTIALS: &str = "credentials";

/// Account service for business logic.
#[derive(Clone)]
pub struct AccountService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for registering a password account.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(email, length(max = 256))]
    pub email: String,

    #[validate(length(max = 256))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a password account.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        let email = input.email.trim().to_lowercase();
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(email),
            name: Set(input.name.filter(|n| !n.trim().is_empty())),
            password: Set(Some(password_hash)),
            image: Set(None),
            provider: Set(PROVIDER_CREDENTIALS.to_string()),
            token: Set(Some(self.id_gen.generate_token())),
            created_at: Set(Utc::now().into()),
        };

        let user = self.user_repo.create(model).await?;
        info!(user_id = %user.id, "Account registered");

        Ok(user)
    }

    /// Check an email and password pair.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_email(email.trim())
            .await?
            .ok_or(AppError::Unauthorized)?;

        // Federated accounts have no password
        let password_hash = user.password.as_deref().ok_or(AppError::Unauthorized)?;
        if !verify_password(password, password_hash)? {
            return Err(AppError::Unauthorized);
        }

        self.ensure_token(user).await
    }

    /// Find the account for a federated profile, creating it on first sign-in.
    pub async fn find_or_provision(
        &self,
        provider: &str,
        email: &str,
        profile: &FederatedProfile,
    ) -> AppResult<user::Model> {
        let email = email.trim().to_lowercase();

        if let Some(existing) = self.user_repo.find_by_email(&email).await? {
            return self.ensure_token(existing).await;
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(email),
            name: Set(profile.name.clone()),
            password: Set(None),
            image: Set(profile.picture.clone()),
            provider: Set(provider.to_string()),
            token: Set(Some(self.id_gen.generate_token())),
            created_at: Set(Utc::now().into()),
        };

        let user = self.user_repo.create(model).await?;
        info!(user_id = %user.id, provider = provider, "Federated account provisioned");

        Ok(user)
    }

    /// Authenticate a user by session token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// End the current session by replacing the account's token.
    pub async fn sign_out(&self, user: user::Model) -> AppResult<()> {
        let user_id = user.id.clone();
        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(self.id_gen.generate_token()));

        self.user_repo.update(active).await?;
        info!(user_id = %user_id, "Signed out");

        Ok(())
    }

    async fn ensure_token(&self, user: user::Model) -> AppResult<user::Model> {
        if user.token.is_some() {
            return Ok(user);
        }

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(self.id_gen.generate_token()));
        self.user_repo.update(active).await
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> AccountService {
        AccountService::new(UserRepository::new(Arc::new(db)))
    }

    fn create_test_user(password: Option<&str>) -> user::Model {
        user::Model {
            id: "user1".to_string(),
            email: "alice@example.com".to_string(),
            name: Some("Alice".to_string()),
            password: password.map(|p| hash_password(p).unwrap()),
            image: None,
            provider: PROVIDER_CREDENTIALS.to_string(),
            token: Some("token1".to_string()),
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("hunter2").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db)
            .register(RegisterInput {
                email: "not-an-email".to_string(),
                name: None,
                password: "secret".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_empty_password() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db)
            .register(RegisterInput {
                email: "alice@example.com".to_string(),
                name: None,
                password: String::new(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user(Some("secret"))]])
            .into_connection();

        let result = service(db)
            .register(RegisterInput {
                email: "Alice@Example.com".to_string(),
                name: None,
                password: "secret".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user(Some("secret"))]])
            .into_connection();

        let user = service(db)
            .verify_credentials("alice@example.com", "secret")
            .await
            .unwrap();

        assert_eq!(user.id, "user1");
    }

    #[tokio::test]
    async fn test_verify_credentials_wrong_password() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user(Some("secret"))]])
            .into_connection();

        let result = service(db)
            .verify_credentials("alice@example.com", "guess")
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_verify_credentials_without_password() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user(None)]])
            .into_connection();

        let result = service(db)
            .verify_credentials("alice@example.com", "anything")
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_authenticate_by_unknown_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let result = service(db).authenticate_by_token("stale").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
