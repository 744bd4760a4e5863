//! SQLite expense and category repository implementation.
//!
//! Implements `ExpenseRepository` from `tally-core`. Amounts are stored as
//! integer cents; categories are a shared lookup table joined by id and
//! matched case-insensitively through the column collation.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{QueryBuilder, Row, Sqlite};

use tally_core::repository::expense::ExpenseRepository;
use tally_types::error::RepositoryError;
use tally_types::expense::{
    Category, Expense, ExpenseId, ExpenseQuery, ExpenseSort, from_cents, to_cents,
};
use tally_types::user::UserId;

use super::pool::DatabasePool;

const SELECT_EXPENSES: &str = "SELECT e.*, c.name AS category_name FROM expenses e \
     LEFT JOIN categories c ON c.id = e.category_id";

/// SQLite-backed implementation of `ExpenseRepository`.
#[derive(Clone)]
pub struct SqliteExpenseRepository {
    pool: DatabasePool,
}

impl SqliteExpenseRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Look up a category id by name. `None` in, `None` out.
    async fn category_id(&self, name: Option<&str>) -> Result<Option<i64>, RepositoryError> {
        let Some(name) = name else {
            return Ok(None);
        };

        let row = sqlx::query("SELECT id FROM categories WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let id: i64 = row
                    .try_get("id")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(id))
            }
            None => Err(RepositoryError::Query(format!("unknown category '{name}'"))),
        }
    }
}

/// Internal row type for mapping SQLite rows to domain Expense.
struct ExpenseRow {
    id: String,
    user_id: String,
    title: String,
    amount_cents: i64,
    category_name: Option<String>,
    date: String,
    notes: Option<String>,
    recurring: i64,
    created_at: String,
    updated_at: String,
}

impl ExpenseRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            amount_cents: row.try_get("amount_cents")?,
            category_name: row.try_get("category_name")?,
            date: row.try_get("date")?,
            notes: row.try_get("notes")?,
            recurring: row.try_get("recurring")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_expense(self) -> Result<Expense, RepositoryError> {
        let id = self
            .id
            .parse::<ExpenseId>()
            .map_err(|e| RepositoryError::Query(format!("invalid expense id: {e}")))?;
        let user_id = self
            .user_id
            .parse::<UserId>()
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;
        let date = self
            .date
            .parse::<NaiveDate>()
            .map_err(|e| RepositoryError::Query(format!("invalid date: {e}")))?;

        Ok(Expense {
            id,
            user_id,
            title: self.title,
            amount: from_cents(self.amount_cents),
            category: self.category_name,
            date,
            notes: self.notes,
            recurring: self.recurring != 0,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn cents(amount: Decimal) -> Result<i64, RepositoryError> {
    to_cents(amount).ok_or_else(|| RepositoryError::Query(format!("amount out of range: {amount}")))
}

fn rows_to_expenses(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<Expense>, RepositoryError> {
    let mut expenses = Vec::with_capacity(rows.len());
    for row in rows {
        let expense_row =
            ExpenseRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
        expenses.push(expense_row.into_expense()?);
    }
    Ok(expenses)
}

/// Escape LIKE wildcards so user search text matches literally.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn order_by(sort: ExpenseSort) -> &'static str {
    match sort {
        ExpenseSort::Newest => " ORDER BY e.date DESC, e.created_at DESC",
        ExpenseSort::Oldest => " ORDER BY e.date ASC, e.created_at ASC",
        ExpenseSort::High => " ORDER BY e.amount_cents DESC, e.date DESC",
        ExpenseSort::Low => " ORDER BY e.amount_cents ASC, e.date DESC",
    }
}

impl ExpenseRepository for SqliteExpenseRepository {
    async fn create(&self, expense: &Expense) -> Result<Expense, RepositoryError> {
        let category_id = self.category_id(expense.category.as_deref()).await?;

        sqlx::query(
            "INSERT INTO expenses (id, user_id, title, amount_cents, category_id, date, notes, recurring, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(expense.id.to_string())
        .bind(expense.user_id.to_string())
        .bind(&expense.title)
        .bind(cents(expense.amount)?)
        .bind(category_id)
        .bind(expense.date.to_string())
        .bind(&expense.notes)
        .bind(expense.recurring as i64)
        .bind(format_datetime(&expense.created_at))
        .bind(format_datetime(&expense.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(expense.clone())
    }

    async fn get(&self, user_id: &UserId, id: &ExpenseId) -> Result<Option<Expense>, RepositoryError> {
        let sql = format!("{SELECT_EXPENSES} WHERE e.id = ? AND e.user_id = ?");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let expense_row =
                    ExpenseRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(expense_row.into_expense()?))
            }
            None => Ok(None),
        }
    }

    async fn update(&self, expense: &Expense) -> Result<Expense, RepositoryError> {
        let category_id = self.category_id(expense.category.as_deref()).await?;

        let result = sqlx::query(
            "UPDATE expenses SET title = ?, amount_cents = ?, category_id = ?, date = ?, notes = ?, recurring = ?, updated_at = ?
             WHERE id = ? AND user_id = ?",
        )
        .bind(&expense.title)
        .bind(cents(expense.amount)?)
        .bind(category_id)
        .bind(expense.date.to_string())
        .bind(&expense.notes)
        .bind(expense.recurring as i64)
        .bind(format_datetime(&expense.updated_at))
        .bind(expense.id.to_string())
        .bind(expense.user_id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(expense.clone())
    }

    async fn delete(&self, user_id: &UserId, id: &ExpenseId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list(&self, user_id: &UserId, query: &ExpenseQuery) -> Result<Vec<Expense>, RepositoryError> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_EXPENSES);
        builder.push(" WHERE e.user_id = ").push_bind(user_id.to_string());

        if let Some(ref category) = query.category {
            builder.push(" AND c.name = ").push_bind(category.clone());
        }
        if let Some(start) = query.start {
            builder.push(" AND e.date >= ").push_bind(start.to_string());
        }
        if let Some(end) = query.end {
            builder.push(" AND e.date <= ").push_bind(end.to_string());
        }
        if let Some(ref search) = query.search {
            builder
                .push(" AND LOWER(e.title) LIKE ")
                .push_bind(like_pattern(search))
                .push(" ESCAPE '\\'");
        }
        builder.push(order_by(query.sort));

        let rows = builder
            .build()
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows_to_expenses(&rows)
    }

    async fn total_for_category(&self, user_id: &UserId, category: &str) -> Result<Decimal, RepositoryError> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(e.amount_cents), 0) AS total FROM expenses e
             JOIN categories c ON c.id = e.category_id
             WHERE e.user_id = ? AND c.name = ?",
        )
        .bind(user_id.to_string())
        .bind(category)
        .fetch_one(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let total: i64 = row
            .try_get("total")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(from_cents(total))
    }

    async fn list_recurring(&self) -> Result<Vec<Expense>, RepositoryError> {
        let sql = format!("{SELECT_EXPENSES} WHERE e.recurring = 1 ORDER BY e.date ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows_to_expenses(&rows)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query("SELECT id, name FROM categories ORDER BY id ASC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut categories = Vec::with_capacity(rows.len());
        for row in &rows {
            categories.push(Category {
                id: row
                    .try_get("id")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?,
                name: row
                    .try_get("name")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?,
            });
        }
        Ok(categories)
    }

    async fn ensure_categories(&self, names: &[String]) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            sqlx::query("INSERT OR IGNORE INTO categories (name) VALUES (?)")
                .bind(name)
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak the tempdir so it doesn't get cleaned up while the pool is in use
        let pool = DatabasePool::new(&url).await.unwrap();
        std::mem::forget(dir);
        pool
    }

    async fn setup() -> (SqliteExpenseRepository, UserId) {
        let pool = test_pool().await;
        let user_id = insert_user(&pool, "alice").await;
        let repo = SqliteExpenseRepository::new(pool);
        repo.ensure_categories(&["Food".to_string(), "Travel".to_string(), "Bills".to_string()])
            .await
            .unwrap();
        (repo, user_id)
    }

    async fn insert_user(pool: &DatabasePool, username: &str) -> UserId {
        let id = UserId::new();
        sqlx::query("INSERT INTO users (id, username, password_hash, created_at) VALUES (?, ?, 'x', ?)")
            .bind(id.to_string())
            .bind(username)
            .bind(Utc::now().to_rfc3339())
            .execute(&pool.writer)
            .await
            .unwrap();
        id
    }

    fn make_expense(user_id: UserId, title: &str, amount: &str, category: Option<&str>, date: &str) -> Expense {
        let now = Utc::now();
        Expense {
            id: ExpenseId::new(),
            user_id,
            title: title.to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            category: category.map(String::from),
            date: date.parse().unwrap(),
            notes: None,
            recurring: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_expense() {
        let (repo, user) = setup().await;
        let expense = make_expense(user, "Lunch", "12.50", Some("food"), "2024-03-14");
        repo.create(&expense).await.unwrap();

        let stored = repo.get(&user, &expense.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Lunch");
        assert_eq!(stored.amount.to_string(), "12.50");
        // Canonical category name comes back from the lookup table.
        assert_eq!(stored.category.as_deref(), Some("Food"));
        assert_eq!(stored.date, NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
    }

    #[tokio::test]
    async fn test_get_is_scoped_to_owner() {
        let (repo, alice) = setup().await;
        let bob = insert_user(&repo.pool, "bob").await;
        let expense = make_expense(alice, "Lunch", "12.50", None, "2024-03-14");
        repo.create(&expense).await.unwrap();

        assert!(repo.get(&bob, &expense.id).await.unwrap().is_none());
        let err = repo.delete(&bob, &expense.id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));

        let mut stolen = expense.clone();
        stolen.user_id = bob;
        let err = repo.update(&stolen).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (repo, user) = setup().await;
        let mut expense = make_expense(user, "Taxi", "7.00", Some("Travel"), "2024-03-10");
        repo.create(&expense).await.unwrap();

        expense.amount = Decimal::from_str("9.25").unwrap();
        expense.category = None;
        expense.notes = Some("airport".to_string());
        repo.update(&expense).await.unwrap();

        let stored = repo.get(&user, &expense.id).await.unwrap().unwrap();
        assert_eq!(stored.amount.to_string(), "9.25");
        assert!(stored.category.is_none());
        assert_eq!(stored.notes.as_deref(), Some("airport"));

        repo.delete(&user, &expense.id).await.unwrap();
        assert!(repo.get(&user, &expense.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_with_unknown_category_fails() {
        let (repo, user) = setup().await;
        let expense = make_expense(user, "Gift", "20", Some("Gifts"), "2024-03-14");
        assert!(repo.create(&expense).await.is_err());
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts() {
        let (repo, user) = setup().await;
        for (title, amount, category, date) in [
            ("Lunch", "12.50", Some("Food"), "2024-03-14"),
            ("Dinner", "30.00", Some("Food"), "2024-03-01"),
            ("Train ticket", "55.00", Some("Travel"), "2024-03-13"),
            ("Rent", "900.00", Some("Bills"), "2024-02-28"),
            ("Snack 100%", "2.00", None, "2024-03-14"),
        ] {
            repo.create(&make_expense(user, title, amount, category, date))
                .await
                .unwrap();
        }

        let all = repo.list(&user, &ExpenseQuery::default()).await.unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(all.last().unwrap().title, "Rent");

        let food = repo
            .list(
                &user,
                &ExpenseQuery {
                    category: Some("FOOD".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(food.len(), 2);

        let march = repo
            .list(
                &user,
                &ExpenseQuery {
                    start: NaiveDate::from_ymd_opt(2024, 3, 1),
                    end: NaiveDate::from_ymd_opt(2024, 3, 31),
                    sort: ExpenseSort::High,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let titles: Vec<&str> = march.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Train ticket", "Dinner", "Lunch", "Snack 100%"]);

        let search = repo
            .list(
                &user,
                &ExpenseQuery {
                    search: Some("TICKET".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(search.len(), 1);

        // Wildcards in search text match literally.
        let percent = repo
            .list(
                &user,
                &ExpenseQuery {
                    search: Some("%".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].title, "Snack 100%");

        let oldest = repo
            .list(
                &user,
                &ExpenseQuery {
                    sort: ExpenseSort::Oldest,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(oldest[0].title, "Rent");
    }

    #[tokio::test]
    async fn test_total_for_category() {
        let (repo, alice) = setup().await;
        let bob = insert_user(&repo.pool, "bob").await;
        repo.create(&make_expense(alice, "Lunch", "12.50", Some("Food"), "2024-03-14"))
            .await
            .unwrap();
        repo.create(&make_expense(alice, "Coffee", "7.00", Some("Food"), "2024-03-13"))
            .await
            .unwrap();
        repo.create(&make_expense(bob, "Pizza", "40.00", Some("Food"), "2024-03-13"))
            .await
            .unwrap();

        let total = repo.total_for_category(&alice, "food").await.unwrap();
        assert_eq!(total.to_string(), "19.50");

        let none = repo.total_for_category(&alice, "Travel").await.unwrap();
        assert_eq!(none, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_list_recurring_spans_users() {
        let (repo, alice) = setup().await;
        let bob = insert_user(&repo.pool, "bob").await;

        let mut rent = make_expense(alice, "Rent", "900", Some("Bills"), "2024-02-01");
        rent.recurring = true;
        let mut gym = make_expense(bob, "Gym", "30", None, "2024-02-05");
        gym.recurring = true;
        let lunch = make_expense(alice, "Lunch", "12", Some("Food"), "2024-02-06");

        for e in [&rent, &gym, &lunch] {
            repo.create(e).await.unwrap();
        }

        let recurring = repo.list_recurring().await.unwrap();
        assert_eq!(recurring.len(), 2);
        assert!(recurring.iter().all(|e| e.recurring));
    }

    #[tokio::test]
    async fn test_ensure_categories_is_idempotent_and_case_insensitive() {
        let (repo, _) = setup().await;
        repo.ensure_categories(&["food".to_string(), "Shopping".to_string(), " ".to_string()])
            .await
            .unwrap();

        let names: Vec<String> = repo
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Food", "Travel", "Bills", "Shopping"]);
    }
}
