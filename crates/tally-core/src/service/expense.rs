//! Expense management service.
//!
//! Owner-scoped CRUD, filtered listings, the dashboard, voice entries, and
//! the monthly recurring job. Date-relative rules use the service clock,
//! which defaults to the local calendar date.

use chrono::{Local, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::info;

use tally_types::chat::Outcome;
use tally_types::error::{ExpenseError, RepositoryError};
use tally_types::expense::{
    Category, CreateExpenseRequest, DashboardSummary, Expense, ExpenseFilter, ExpenseId,
    UpdateExpenseRequest,
};
use tally_types::user::UserId;

use crate::expense::{dashboard, filter, recurring, speech};
use crate::repository::expense::ExpenseRepository;

const TITLE_MAX: usize = 100;
/// Ten digits in total, two of them after the point.
const AMOUNT_MAX_INTEGER_DIGITS: u32 = 8;

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

fn storage(e: RepositoryError) -> ExpenseError {
    match e {
        RepositoryError::NotFound => ExpenseError::NotFound,
        other => ExpenseError::StorageError(other.to_string()),
    }
}

fn validate_title(title: &str) -> Result<String, ExpenseError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ExpenseError::InvalidTitle("title cannot be empty".to_string()));
    }
    if title.chars().count() > TITLE_MAX {
        return Err(ExpenseError::InvalidTitle(format!(
            "title must be at most {TITLE_MAX} characters"
        )));
    }
    Ok(title.to_string())
}

/// Positive, at most two decimal places, at most ten digits overall.
pub fn validate_amount(amount: Decimal) -> Result<Decimal, ExpenseError> {
    if amount <= Decimal::ZERO {
        return Err(ExpenseError::InvalidAmount("amount must be positive".to_string()));
    }
    let normalized = amount.normalize();
    if normalized.scale() > 2 {
        return Err(ExpenseError::InvalidAmount(
            "amount can have at most 2 decimal places".to_string(),
        ));
    }
    if normalized.trunc() >= Decimal::from(10_i64.pow(AMOUNT_MAX_INTEGER_DIGITS)) {
        return Err(ExpenseError::InvalidAmount(
            "amount can have at most 10 digits".to_string(),
        ));
    }
    let mut amount = normalized;
    amount.rescale(2);
    Ok(amount)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Service orchestrating the expense ledger.
pub struct ExpenseService<E: ExpenseRepository> {
    repo: E,
    today: fn() -> NaiveDate,
}

impl<E: ExpenseRepository> ExpenseService<E> {
    pub fn new(repo: E) -> Self {
        Self {
            repo,
            today: local_today,
        }
    }

    /// Replace the clock used for "today".
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn repo(&self) -> &E {
        &self.repo
    }

    pub fn today(&self) -> NaiveDate {
        (self.today)()
    }

    /// Map a user-supplied category name onto the stored name.
    async fn resolve_category(&self, name: Option<String>) -> Result<Option<String>, ExpenseError> {
        let Some(name) = non_blank(name) else {
            return Ok(None);
        };
        let categories = self.repo.list_categories().await.map_err(storage)?;
        categories
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(&name))
            .map(|c| Some(c.name))
            .ok_or(ExpenseError::UnknownCategory(name))
    }

    #[tracing::instrument(name = "create_expense", skip(self, user_id, request), fields(user_id = %user_id))]
    pub async fn create(
        &self,
        user_id: &UserId,
        request: CreateExpenseRequest,
    ) -> Result<Expense, ExpenseError> {
        let title = validate_title(&request.title)?;
        let amount = validate_amount(request.amount)?;
        let category = self.resolve_category(request.category).await?;
        let now = Utc::now();

        let expense = Expense {
            id: ExpenseId::new(),
            user_id: *user_id,
            title,
            amount,
            category,
            date: request.date.unwrap_or_else(|| self.today()),
            notes: non_blank(request.notes),
            recurring: request.recurring,
            created_at: now,
            updated_at: now,
        };

        self.repo.create(&expense).await.map_err(storage)
    }

    pub async fn get(&self, user_id: &UserId, id: &ExpenseId) -> Result<Expense, ExpenseError> {
        self.repo
            .get(user_id, id)
            .await
            .map_err(storage)?
            .ok_or(ExpenseError::NotFound)
    }

    /// Apply a partial update to one of the user's expenses.
    #[tracing::instrument(name = "update_expense", skip(self, user_id, id, request), fields(user_id = %user_id, expense_id = %id))]
    pub async fn update(
        &self,
        user_id: &UserId,
        id: &ExpenseId,
        request: UpdateExpenseRequest,
    ) -> Result<Expense, ExpenseError> {
        let mut expense = self.get(user_id, id).await?;

        if let Some(title) = request.title {
            expense.title = validate_title(&title)?;
        }
        if let Some(amount) = request.amount {
            expense.amount = validate_amount(amount)?;
        }
        if let Some(category) = request.category {
            expense.category = self.resolve_category(category).await?;
        }
        if let Some(date) = request.date {
            expense.date = date;
        }
        if let Some(notes) = request.notes {
            expense.notes = non_blank(notes);
        }
        if let Some(recurring) = request.recurring {
            expense.recurring = recurring;
        }
        expense.updated_at = Utc::now();

        self.repo.update(&expense).await.map_err(storage)
    }

    pub async fn delete(&self, user_id: &UserId, id: &ExpenseId) -> Result<(), ExpenseError> {
        self.repo.delete(user_id, id).await.map_err(storage)
    }

    pub async fn list(
        &self,
        user_id: &UserId,
        filter: &ExpenseFilter,
    ) -> Result<Vec<Expense>, ExpenseError> {
        let query = filter::resolve(filter, self.today());
        self.repo.list(user_id, &query).await.map_err(storage)
    }

    /// Aggregates over the filtered set.
    pub async fn dashboard(
        &self,
        user_id: &UserId,
        filter: &ExpenseFilter,
    ) -> Result<DashboardSummary, ExpenseError> {
        let today = self.today();
        let expenses = self
            .repo
            .list(user_id, &filter::resolve(filter, today))
            .await
            .map_err(storage)?;
        Ok(dashboard::summarize(&expenses, today))
    }

    /// Record an expense from a spoken sentence.
    ///
    /// Never fails for unparseable speech; the outcome says what happened.
    #[tracing::instrument(name = "voice_expense", skip(self, user_id, speech), fields(user_id = %user_id))]
    pub async fn add_from_speech(
        &self,
        user_id: &UserId,
        speech: &str,
    ) -> Result<Outcome, ExpenseError> {
        let categories = self.repo.list_categories().await.map_err(storage)?;
        let draft = speech::parse(speech, &categories);

        let Some(amount) = draft.amount.and_then(|a| validate_amount(a).ok()) else {
            return Ok(Outcome::failed("⚠️ Could not detect amount."));
        };

        let now = Utc::now();
        let expense = Expense {
            id: ExpenseId::new(),
            user_id: *user_id,
            title: draft.title(),
            amount,
            category: draft.category.clone(),
            date: self.today(),
            notes: None,
            recurring: false,
            created_at: now,
            updated_at: now,
        };
        self.repo.create(&expense).await.map_err(storage)?;

        Ok(Outcome::ok(format!(
            "✅ Added {} in {}",
            amount.normalize(),
            draft.label()
        )))
    }

    /// Insert this month's copy of every recurring series that lacks one.
    ///
    /// Returns the inserted expenses.
    #[tracing::instrument(name = "create_recurring", skip(self))]
    pub async fn create_recurring(&self, today: NaiveDate) -> Result<Vec<Expense>, ExpenseError> {
        let existing = self.repo.list_recurring().await.map_err(storage)?;
        let copies = recurring::plan(&existing, today);

        for copy in &copies {
            self.repo.create(copy).await.map_err(storage)?;
        }
        info!(created = copies.len(), "recurring expenses created");
        Ok(copies)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, ExpenseError> {
        self.repo.list_categories().await.map_err(storage)
    }

    /// Make sure every configured category exists.
    pub async fn seed_categories(&self, names: &[String]) -> Result<(), ExpenseError> {
        self.repo.ensure_categories(names).await.map_err(storage)
    }
}
