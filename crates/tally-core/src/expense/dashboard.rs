//! Dashboard aggregation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use tally_types::expense::{CategoryTotal, DashboardSummary, Expense, UNCATEGORIZED};

use super::filter::{month_end, month_start, week_start};

/// Aggregate an already-filtered expense set relative to `today`.
///
/// `week` counts from Monday of the current week; `month` is the current
/// calendar month. Category totals are ordered by descending total, then name.
pub fn summarize(expenses: &[Expense], today: NaiveDate) -> DashboardSummary {
    let monday = week_start(today);
    let (first, last) = (month_start(today), month_end(today));

    let mut total = Decimal::ZERO;
    let mut today_total = Decimal::ZERO;
    let mut week = Decimal::ZERO;
    let mut month = Decimal::ZERO;
    let mut by_category: BTreeMap<&str, Decimal> = BTreeMap::new();

    for expense in expenses {
        total += expense.amount;
        if expense.date == today {
            today_total += expense.amount;
        }
        if expense.date >= monday {
            week += expense.amount;
        }
        if expense.date >= first && expense.date <= last {
            month += expense.amount;
        }
        let name = expense.category.as_deref().unwrap_or(UNCATEGORIZED);
        *by_category.entry(name).or_default() += expense.amount;
    }

    let mut by_category: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect();
    by_category.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));

    DashboardSummary {
        total,
        today: today_total,
        week,
        month,
        by_category,
        expense_count: expenses.len(),
    }
}
