//! Prompt text for the fallback answer and for compression.

use tally_types::chat::ChatTurn;

/// Render turns as `role: content` lines, oldest first.
pub fn transcript(turns: &[ChatTurn]) -> String {
    turns
        .iter()
        .map(ChatTurn::line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prompt for the completion service when no deterministic strategy answered.
///
/// `window` holds the turns preceding the new message; the message itself is
/// always rendered last.
pub fn build_chat_prompt(summary: Option<&str>, window: &[ChatTurn], message: &str) -> String {
    let lines = transcript(window);
    let lines = if lines.is_empty() {
        lines
    } else {
        format!("{lines}\n")
    };
    format!(
        "User's past memory: {}\n\nRecent conversation:\n{lines}user: {message}\nassistant:",
        summary.unwrap_or_default()
    )
}

/// Prompt asking the completion service to fold a transcript into a summary.
///
/// The previous summary is deliberately absent: each compression replaces it.
pub fn build_compression_prompt(turns: &[ChatTurn]) -> String {
    format!(
        "Summarize the following conversation into key facts and user preferences:\n\n{}",
        transcript(turns)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tally_types::chat::TurnRole;
    use tally_types::user::UserId;

    fn turn(seq: i64, role: TurnRole, content: &str) -> ChatTurn {
        ChatTurn {
            seq,
            user_id: UserId::new(),
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_chat_prompt_layout() {
        let window = vec![
            turn(1, TurnRole::User, "hi"),
            turn(2, TurnRole::Assistant, "hello!"),
        ];
        let prompt = build_chat_prompt(Some("likes coffee"), &window, "what's new?");
        assert_eq!(
            prompt,
            "User's past memory: likes coffee\n\nRecent conversation:\nuser: hi\nassistant: hello!\nuser: what's new?\nassistant:"
        );
    }

    #[test]
    fn test_chat_prompt_without_summary_or_history() {
        let prompt = build_chat_prompt(None, &[], "hello");
        assert_eq!(
            prompt,
            "User's past memory: \n\nRecent conversation:\nuser: hello\nassistant:"
        );
    }

    #[test]
    fn test_compression_prompt_contains_transcript() {
        let turns = vec![
            turn(1, TurnRole::User, "I am vegetarian"),
            turn(2, TurnRole::Assistant, "Noted"),
        ];
        let prompt = build_compression_prompt(&turns);
        assert!(prompt.starts_with(
            "Summarize the following conversation into key facts and user preferences:\n\n"
        ));
        assert!(prompt.ends_with("user: I am vegetarian\nassistant: Noted"));
    }
}
