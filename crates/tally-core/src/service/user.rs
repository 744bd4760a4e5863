//! Account service: registration, login, API keys, and profiles.

use chrono::Utc;
use tracing::{info, warn};

use tally_types::error::{AuthError, RepositoryError};
use tally_types::user::{Credentials, IssuedKey, UpdateProfileRequest, User, UserId, UserProfile};

use crate::repository::user::UserRepository;
use crate::service::credentials::CredentialHasher;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 150;
const PASSWORD_MIN: usize = 8;

/// Validate a username: 3..=150 characters of letters, digits, and `@.+-_`.
pub fn validate_username(username: &str) -> Result<(), AuthError> {
    let len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(AuthError::InvalidUsername(format!(
            "must be {USERNAME_MIN} to {USERNAME_MAX} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(AuthError::InvalidUsername(
            "only letters, digits and @/./+/-/_ are allowed".to_string(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < PASSWORD_MIN {
        return Err(AuthError::InvalidPassword(format!(
            "must be at least {PASSWORD_MIN} characters"
        )));
    }
    Ok(())
}

fn storage(e: RepositoryError) -> AuthError {
    AuthError::StorageError(e.to_string())
}

/// Service owning the account lifecycle.
///
/// Generic over the repository and hasher so tally-core never depends on
/// tally-infra.
pub struct UserService<R: UserRepository, H: CredentialHasher> {
    repo: R,
    hasher: H,
}

impl<R: UserRepository, H: CredentialHasher> UserService<R, H> {
    pub fn new(repo: R, hasher: H) -> Self {
        Self { repo, hasher }
    }

    /// Create an account with an empty profile and issue its first API key.
    #[tracing::instrument(name = "register", skip(self, credentials), fields(username = %credentials.username))]
    pub async fn register(&self, credentials: &Credentials) -> Result<IssuedKey, AuthError> {
        let username = credentials.username.trim();
        validate_username(username)?;
        validate_password(&credentials.password)?;

        let password_hash = self.hasher.hash_password(&credentials.password)?;
        let user = User {
            id: UserId::new(),
            username: username.to_string(),
            password_hash,
            created_at: Utc::now(),
        };
        let profile = UserProfile {
            user_id: user.id,
            ..Default::default()
        };

        let user = self
            .repo
            .create(&user, &profile)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UsernameTaken(username.to_string()),
                other => storage(other),
            })?;

        info!(user_id = %user.id, "user registered");
        self.issue_key(&user, "register").await
    }

    /// Verify credentials and issue a new API key.
    #[tracing::instrument(name = "login", skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<IssuedKey, AuthError> {
        let user = self
            .repo
            .get_by_username(credentials.username.trim())
            .await
            .map_err(storage)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self
            .hasher
            .verify_password(&credentials.password, &user.password_hash)
        {
            warn!(user_id = %user.id, "login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_key(&user, "login").await
    }

    async fn issue_key(&self, user: &User, name: &str) -> Result<IssuedKey, AuthError> {
        let api_key = self.hasher.generate_api_key();
        self.repo
            .store_api_key(&user.id, &self.hasher.hash_api_key(&api_key), name)
            .await
            .map_err(storage)?;
        Ok(IssuedKey {
            user_id: user.id,
            username: user.username.clone(),
            api_key,
        })
    }

    /// Revoke the given API key.
    pub async fn logout(&self, api_key: &str) -> Result<(), AuthError> {
        let removed = self
            .repo
            .revoke_api_key(&self.hasher.hash_api_key(api_key))
            .await
            .map_err(storage)?;
        if removed {
            Ok(())
        } else {
            Err(AuthError::InvalidApiKey)
        }
    }

    /// Resolve an API key to its owner. Usage is recorded best-effort.
    pub async fn authenticate(&self, api_key: &str) -> Result<UserId, AuthError> {
        let key_hash = self.hasher.hash_api_key(api_key);
        let user_id = self
            .repo
            .find_api_key(&key_hash)
            .await
            .map_err(storage)?
            .ok_or(AuthError::InvalidApiKey)?;

        if let Err(e) = self.repo.touch_api_key(&key_hash).await {
            warn!(error = %e, "failed to record api key usage");
        }
        Ok(user_id)
    }

    pub async fn get_user(&self, user_id: &UserId) -> Result<User, AuthError> {
        self.repo
            .get_by_id(user_id)
            .await
            .map_err(storage)?
            .ok_or(AuthError::UserNotFound)
    }

    pub async fn get_by_username(&self, username: &str) -> Result<User, AuthError> {
        self.repo
            .get_by_username(username.trim())
            .await
            .map_err(storage)?
            .ok_or(AuthError::UserNotFound)
    }

    pub async fn get_profile(&self, user_id: &UserId) -> Result<UserProfile, AuthError> {
        self.repo
            .get_profile(user_id)
            .await
            .map_err(storage)?
            .ok_or(AuthError::UserNotFound)
    }

    /// Apply a partial update. A non-empty email must contain `@`.
    pub async fn update_profile(
        &self,
        user_id: &UserId,
        request: UpdateProfileRequest,
    ) -> Result<UserProfile, AuthError> {
        let mut profile = self.get_profile(user_id).await?;

        if let Some(first_name) = request.first_name {
            profile.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = request.last_name {
            profile.last_name = last_name.trim().to_string();
        }
        if let Some(email) = request.email {
            let email = email.trim();
            if !email.is_empty() && !email.contains('@') {
                return Err(AuthError::InvalidEmail(email.to_string()));
            }
            profile.email = email.to_string();
        }
        profile.updated_at = Some(Utc::now());

        self.repo.update_profile(&profile).await.map_err(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCredentials, InMemoryUserRepository};

    fn service() -> UserService<InMemoryUserRepository, FakeCredentials> {
        UserService::new(InMemoryUserRepository::default(), FakeCredentials::default())
    }

    fn creds(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("al").is_err());
        assert!(validate_username("alice smith").is_err());
        assert!(validate_username(&"a".repeat(151)).is_err());
        assert!(validate_username("alice.b+c@x-y_z").is_ok());
    }

    #[tokio::test]
    async fn test_register_issues_working_key() {
        let svc = service();
        let issued = svc.register(&creds("alice", "password1")).await.unwrap();
        assert_eq!(issued.username, "alice");
        assert_eq!(svc.authenticate(&issued.api_key).await.unwrap(), issued.user_id);

        let profile = svc.get_profile(&issued.user_id).await.unwrap();
        assert!(profile.email.is_empty());
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_case_insensitively() {
        let svc = service();
        svc.register(&creds("alice", "password1")).await.unwrap();
        let err = svc.register(&creds("ALICE", "password2")).await.unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken(ref name) if name == "ALICE"));
    }

    #[tokio::test]
    async fn test_register_rejects_short_password() {
        let err = service().register(&creds("alice", "short")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidPassword(_)));
    }

    #[tokio::test]
    async fn test_login_checks_password() {
        let svc = service();
        svc.register(&creds("bob", "correct-horse")).await.unwrap();

        assert!(svc.login(&creds("bob", "correct-horse")).await.is_ok());
        assert!(matches!(
            svc.login(&creds("bob", "wrong-horse")).await.unwrap_err(),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            svc.login(&creds("nobody", "whatever1")).await.unwrap_err(),
            AuthError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn test_logout_revokes_only_that_key() {
        let svc = service();
        let first = svc.register(&creds("carol", "password1")).await.unwrap();
        let second = svc.login(&creds("carol", "password1")).await.unwrap();

        svc.logout(&first.api_key).await.unwrap();
        assert!(matches!(
            svc.authenticate(&first.api_key).await.unwrap_err(),
            AuthError::InvalidApiKey
        ));
        assert!(svc.authenticate(&second.api_key).await.is_ok());
        assert!(svc.logout(&first.api_key).await.is_err());
    }

    #[tokio::test]
    async fn test_update_profile_partial_and_email_check() {
        let svc = service();
        let issued = svc.register(&creds("dave", "password1")).await.unwrap();

        let profile = svc
            .update_profile(
                &issued.user_id,
                UpdateProfileRequest {
                    first_name: Some("Dave".to_string()),
                    email: Some("dave@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(profile.first_name, "Dave");
        assert_eq!(profile.last_name, "");
        assert!(profile.updated_at.is_some());

        let err = svc
            .update_profile(
                &issued.user_id,
                UpdateProfileRequest {
                    email: Some("not-an-email".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)));
        assert_eq!(
            svc.get_profile(&issued.user_id).await.unwrap().email,
            "dave@example.com"
        );
    }
}
