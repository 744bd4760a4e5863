//! Plan the monthly copies of recurring expenses.
//!
//! A series is identified by owner, title, amount, and category. Each series
//! gets at most one entry per calendar month, so running the job repeatedly
//! within a month is harmless.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;

use tally_types::expense::{Expense, ExpenseId};
use tally_types::user::UserId;

type SeriesKey = (UserId, String, Decimal, Option<String>);

fn series_key(expense: &Expense) -> SeriesKey {
    (
        expense.user_id,
        expense.title.clone(),
        expense.amount,
        expense.category.clone(),
    )
}

/// New expenses to insert for `today`, one per series missing this month.
///
/// Copies take the most recent entry's notes and are flagged recurring.
pub fn plan(recurring: &[Expense], today: NaiveDate) -> Vec<Expense> {
    let mut covered: HashSet<SeriesKey> = HashSet::new();
    let mut latest: HashMap<SeriesKey, &Expense> = HashMap::new();

    for expense in recurring {
        let key = series_key(expense);
        if expense.date.year() == today.year() && expense.date.month() == today.month() {
            covered.insert(key.clone());
        }
        latest
            .entry(key)
            .and_modify(|current| {
                if expense.date > current.date {
                    *current = expense;
                }
            })
            .or_insert(expense);
    }

    let now = Utc::now();
    let mut copies: Vec<Expense> = latest
        .into_iter()
        .filter(|(key, _)| !covered.contains(key))
        .map(|(_, source)| Expense {
            id: ExpenseId::new(),
            user_id: source.user_id,
            title: source.title.clone(),
            amount: source.amount,
            category: source.category.clone(),
            date: today,
            notes: source.notes.clone(),
            recurring: true,
            created_at: now,
            updated_at: now,
        })
        .collect();
    copies.sort_by(|a, b| a.user_id.0.cmp(&b.user_id.0).then_with(|| a.title.cmp(&b.title)));
    copies
}
