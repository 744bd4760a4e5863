//! ConversationStore trait definition.
//!
//! Turns are append-only and only ever deleted in bulk. The summary is a
//! single upserted record per user.

use tally_types::chat::{ChatTurn, MemorySummary, TurnRole};
use tally_types::error::RepositoryError;
use tally_types::user::UserId;

/// Storage for chat turns and rolling summaries.
///
/// Implementations live in tally-infra (e.g., `SqliteConversationStore`).
pub trait ConversationStore: Send + Sync {
    /// Append a turn at the end of the user's sequence.
    fn append(
        &self,
        user_id: &UserId,
        role: TurnRole,
        content: &str,
    ) -> impl std::future::Future<Output = Result<ChatTurn, RepositoryError>> + Send;

    /// The last `limit` turns, oldest first.
    fn recent(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<ChatTurn>, RepositoryError>> + Send;

    fn count(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<usize, RepositoryError>> + Send;

    /// Full history, oldest first.
    fn all_ordered(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Vec<ChatTurn>, RepositoryError>> + Send;

    /// Delete every turn for the user. Returns the number removed.
    fn purge(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    fn get_summary(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<MemorySummary>, RepositoryError>> + Send;

    /// Create or replace the user's summary.
    ///
    /// Blank text is a no-op and never overwrites an existing summary.
    fn put_summary(
        &self,
        user_id: &UserId,
        summary: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete the user's summary if there is one.
    fn clear_summary(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
