//! Expense and category repository trait definition.

use rust_decimal::Decimal;

use tally_types::error::RepositoryError;
use tally_types::expense::{Category, Expense, ExpenseId, ExpenseQuery};
use tally_types::user::UserId;

/// Repository trait for expense and category persistence.
///
/// Every expense lookup is scoped to its owner: asking for another user's
/// expense behaves exactly like asking for one that does not exist.
///
/// Implementations live in tally-infra (e.g., SqliteExpenseRepository).
pub trait ExpenseRepository: Send + Sync {
    /// Insert a new expense. Returns the stored expense.
    fn create(
        &self,
        expense: &Expense,
    ) -> impl std::future::Future<Output = Result<Expense, RepositoryError>> + Send;

    /// Get one of the user's expenses by ID.
    fn get(
        &self,
        user_id: &UserId,
        id: &ExpenseId,
    ) -> impl std::future::Future<Output = Result<Option<Expense>, RepositoryError>> + Send;

    /// Overwrite an existing expense. `NotFound` if it does not belong to the user.
    fn update(
        &self,
        expense: &Expense,
    ) -> impl std::future::Future<Output = Result<Expense, RepositoryError>> + Send;

    /// Delete one of the user's expenses. `NotFound` if nothing was removed.
    fn delete(
        &self,
        user_id: &UserId,
        id: &ExpenseId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// List the user's expenses matching the query, in the query's sort order.
    fn list(
        &self,
        user_id: &UserId,
        query: &ExpenseQuery,
    ) -> impl std::future::Future<Output = Result<Vec<Expense>, RepositoryError>> + Send;

    /// Exact sum of the user's expenses in a category (case-insensitive name match).
    fn total_for_category(
        &self,
        user_id: &UserId,
        category: &str,
    ) -> impl std::future::Future<Output = Result<Decimal, RepositoryError>> + Send;

    /// All expenses flagged as recurring, across every user.
    fn list_recurring(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Expense>, RepositoryError>> + Send;

    /// All categories in creation (id) order.
    fn list_categories(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Category>, RepositoryError>> + Send;

    /// Insert any of the given category names that do not exist yet.
    fn ensure_categories(
        &self,
        names: &[String],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
