//! `tally recurring`: copy recurring expenses into the current month.

use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use crate::state::AppState;

/// Run the monthly recurring job for `date` (default: today).
///
/// # Examples
///
/// ```bash
/// tally recurring
/// tally recurring --date 2024-03-01 --json
/// ```
pub async fn run_recurring(state: &AppState, date: Option<NaiveDate>, json: bool) -> Result<()> {
    let today = date.unwrap_or_else(|| state.expense_service.today());
    let created = state.expense_service.create_recurring(today).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&created)?);
        return Ok(());
    }

    println!();
    if created.is_empty() {
        println!(
            "  {} Nothing to copy for {}.",
            style("i").blue().bold(),
            style(today.format("%B %Y")).cyan()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Title").fg(Color::White),
        Cell::new("Amount").fg(Color::White),
        Cell::new("Category").fg(Color::White),
        Cell::new("Date").fg(Color::White),
    ]);

    for expense in &created {
        table.add_row(vec![
            Cell::new(&expense.title).fg(Color::White),
            Cell::new(expense.amount).fg(Color::Yellow),
            Cell::new(expense.category.as_deref().unwrap_or("-")).fg(Color::Cyan),
            Cell::new(expense.date.format("%Y-%m-%d")).fg(Color::DarkGrey),
        ]);
    }

    println!("{table}");
    println!();
    println!(
        "  {} Created {} recurring expense{}",
        style("✓").green().bold(),
        style(created.len()).bold(),
        if created.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}
