//! Chat memory CLI commands: show and reset.

use anyhow::{Context, Result};
use console::style;
use dialoguer::Confirm;

use tally_core::chat::memory::MEMORY_CLEARED_MSG;
use tally_types::user::User;

use crate::state::AppState;

async fn find_user(state: &AppState, username: &str) -> Result<User> {
    state
        .user_service
        .get_by_username(username)
        .await
        .with_context(|| format!("User '{username}' not found"))
}

/// Print the rolling summary and the recent prompt window for a user.
///
/// # Examples
///
/// ```bash
/// tally memory show alice
/// tally memory show alice --json
/// ```
pub async fn show_memory(state: &AppState, username: &str, json: bool) -> Result<()> {
    let user = find_user(state, username).await?;
    let snapshot = state.memory.snapshot(&user.id).await?;

    if json {
        let out = serde_json::json!({
            "username": user.username,
            "summary": snapshot.summary.as_ref().map(|s| &s.summary),
            "summary_updated_at": snapshot.summary.as_ref().map(|s| s.updated_at),
            "turn_count": snapshot.turn_count,
            "recent": snapshot.recent,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  Memory for '{}'", style(&user.username).cyan().bold());
    println!();

    match &snapshot.summary {
        Some(summary) => {
            println!(
                "  {} {}",
                style("Summary").bold(),
                style(format!(
                    "(updated {})",
                    summary.updated_at.format("%Y-%m-%d %H:%M")
                ))
                .dim()
            );
            for line in summary.summary.lines() {
                println!("    {line}");
            }
        }
        None => println!("  {} No summary yet.", style("i").blue().bold()),
    }
    println!();

    println!(
        "  {} stored turn{}",
        style(snapshot.turn_count).bold(),
        if snapshot.turn_count == 1 { "" } else { "s" }
    );
    for turn in &snapshot.recent {
        println!("    {} {}", style(format!("{}:", turn.role)).dim(), turn.content);
    }
    println!();

    Ok(())
}

/// Wipe a user's turns and summary, asking first unless `force` is set.
pub async fn reset_memory(state: &AppState, username: &str, force: bool, json: bool) -> Result<()> {
    let user = find_user(state, username).await?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Clear all chat memory for '{}'? This cannot be undone.",
                style(&user.username).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.memory.reset_memory(&user.id).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "username": user.username,
                "success": true,
                "msg": MEMORY_CLEARED_MSG,
            }))?
        );
    } else {
        println!();
        println!("  {MEMORY_CLEARED_MSG}");
        println!();
    }

    Ok(())
}
