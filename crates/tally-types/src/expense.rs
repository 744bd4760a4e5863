//! Expense, category, filter, and dashboard types.
//!
//! Amounts are exact decimals with two fractional digits. The storage layer
//! keeps them as integer cents; [`to_cents`] and [`from_cents`] convert.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::user::UserId;

/// Label used for expenses without a category in aggregated views.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Unique identifier for an expense (UUID v7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpenseId(pub Uuid);

impl ExpenseId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ExpenseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExpenseId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A spending category shared by all users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// A single recorded expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub user_id: UserId,
    pub title: String,
    pub amount: Decimal,
    /// Category name, `None` when uncategorized.
    pub category: Option<String>,
    pub date: NaiveDate,
    pub notes: Option<String>,
    /// Whether the monthly recurring job should copy this expense.
    pub recurring: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating an expense.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateExpenseRequest {
    pub title: String,
    pub amount: Decimal,
    pub category: Option<String>,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[serde(default)]
    pub recurring: bool,
}

/// Partial update; `None` leaves the field unchanged.
///
/// `category` and `notes` use a nested option so a client can clear them
/// with an explicit `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateExpenseRequest {
    pub title: Option<String>,
    pub amount: Option<Decimal>,
    #[serde(default, deserialize_with = "nullable")]
    pub category: Option<Option<String>>,
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
    pub recurring: Option<bool>,
}

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Relative date window for expense listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    /// Only today's expenses.
    Today,
    /// The last seven days up to and including today.
    Week,
    /// The current calendar month.
    Month,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRange::Today => write!(f, "today"),
            DateRange::Week => write!(f, "week"),
            DateRange::Month => write!(f, "month"),
        }
    }
}

impl FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "today" => Ok(DateRange::Today),
            "week" => Ok(DateRange::Week),
            "month" => Ok(DateRange::Month),
            other => Err(format!("invalid date range: '{other}'")),
        }
    }
}

/// Sort order for expense listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseSort {
    #[default]
    Newest,
    Oldest,
    High,
    Low,
}

impl fmt::Display for ExpenseSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpenseSort::Newest => write!(f, "newest"),
            ExpenseSort::Oldest => write!(f, "oldest"),
            ExpenseSort::High => write!(f, "high"),
            ExpenseSort::Low => write!(f, "low"),
        }
    }
}

impl FromStr for ExpenseSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest" => Ok(ExpenseSort::Newest),
            "oldest" => Ok(ExpenseSort::Oldest),
            "high" => Ok(ExpenseSort::High),
            "low" => Ok(ExpenseSort::Low),
            other => Err(format!("invalid sort: '{other}'")),
        }
    }
}

/// User-facing filter criteria for listing expenses.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub category: Option<String>,
    pub date_range: Option<DateRange>,
    pub search: Option<String>,
    pub sort: ExpenseSort,
}

/// Storage-level query: the filter resolved against a concrete "today".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseQuery {
    pub category: Option<String>,
    /// Inclusive lower date bound.
    pub start: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub end: Option<NaiveDate>,
    pub search: Option<String>,
    pub sort: ExpenseSort,
}

/// Sum of spend within one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

/// Aggregated spend for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total: Decimal,
    pub today: Decimal,
    pub week: Decimal,
    pub month: Decimal,
    pub by_category: Vec<CategoryTotal>,
    pub expense_count: usize,
}

/// Convert an amount to integer cents. Returns `None` if it does not fit.
pub fn to_cents(amount: Decimal) -> Option<i64> {
    (amount.round_dp(2) * Decimal::ONE_HUNDRED).to_i64()
}

/// Convert integer cents back into a two-digit decimal amount.
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
