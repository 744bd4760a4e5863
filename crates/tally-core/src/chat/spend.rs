//! Spend-query strategy: answers "how much did I spend on X" from the ledger.

use tally_types::error::ChatError;

use super::strategy::{AnswerContext, AnswerStrategy};
use crate::repository::expense::ExpenseRepository;

/// Answers spend questions that name a known category.
///
/// Triggers when the lowercased message contains "spent" or "spend" and a
/// category name as a substring. Categories are checked in creation order and
/// the first hit wins.
pub struct SpendQueryStrategy<E: ExpenseRepository> {
    expenses: E,
}

impl<E: ExpenseRepository> SpendQueryStrategy<E> {
    pub fn new(expenses: E) -> Self {
        Self { expenses }
    }
}

fn asks_about_spend(lowered: &str) -> bool {
    lowered.contains("spent") || lowered.contains("spend")
}

impl<E: ExpenseRepository> AnswerStrategy for SpendQueryStrategy<E> {
    fn name(&self) -> &str {
        "spend_query"
    }

    async fn try_answer(&self, ctx: &AnswerContext<'_>) -> Result<Option<String>, ChatError> {
        let lowered = ctx.message.to_lowercase();
        if !asks_about_spend(&lowered) {
            return Ok(None);
        }

        let categories = self.expenses.list_categories().await?;
        let Some(category) = categories
            .into_iter()
            .find(|c| lowered.contains(&c.name.to_lowercase()))
        else {
            return Ok(None);
        };

        let mut total = self
            .expenses
            .total_for_category(ctx.user_id, &category.name)
            .await?
            .round_dp(2);
        total.rescale(2);

        Ok(Some(format!(
            "💰 You have spent a total of {total} on {}.",
            category.name
        )))
    }
}
