//! User, profile, and API key repository trait definition.

use tally_types::error::RepositoryError;
use tally_types::user::{User, UserId, UserProfile};

/// Repository trait for accounts and their credentials.
///
/// API keys are only ever handled as SHA-256 hex digests at this layer.
pub trait UserRepository: Send + Sync {
    /// Create a user together with its (empty) profile.
    ///
    /// Returns `Conflict` if the username is taken (case-insensitive).
    fn create(
        &self,
        user: &User,
        profile: &UserProfile,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    fn get_by_id(
        &self,
        id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Case-insensitive username lookup.
    fn get_by_username(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    fn get_profile(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<UserProfile>, RepositoryError>> + Send;

    fn update_profile(
        &self,
        profile: &UserProfile,
    ) -> impl std::future::Future<Output = Result<UserProfile, RepositoryError>> + Send;

    /// Store a newly issued API key hash for the user.
    fn store_api_key(
        &self,
        user_id: &UserId,
        key_hash: &str,
        name: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Resolve a key hash to its owner.
    fn find_api_key(
        &self,
        key_hash: &str,
    ) -> impl std::future::Future<Output = Result<Option<UserId>, RepositoryError>> + Send;

    /// Record that a key was just used.
    fn touch_api_key(
        &self,
        key_hash: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a key. Returns whether a key was removed.
    fn revoke_api_key(
        &self,
        key_hash: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
