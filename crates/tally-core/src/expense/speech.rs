//! Turn a spoken sentence into an expense draft.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use tally_types::expense::Category;

/// Title fallback and reply label when no category was heard.
pub const FALLBACK_LABEL: &str = "Other";

static AMOUNT: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\d+(\.\d+)?").ok());

/// What could be recognized in an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechDraft {
    /// First number in the text, if any.
    pub amount: Option<Decimal>,
    /// Stored name of the first category mentioned, in the given order.
    pub category: Option<String>,
}

impl SpeechDraft {
    /// `Voice Entry - {category or Other}`
    pub fn title(&self) -> String {
        format!("Voice Entry - {}", self.label())
    }

    pub fn label(&self) -> &str {
        self.category.as_deref().unwrap_or(FALLBACK_LABEL)
    }
}

/// Parse `speech` case-insensitively against the known categories.
pub fn parse(speech: &str, categories: &[Category]) -> SpeechDraft {
    let lowered = speech.to_lowercase();

    let amount = AMOUNT
        .as_ref()
        .and_then(|re| re.find(&lowered))
        .and_then(|m| Decimal::from_str(m.as_str()).ok());

    let category = categories
        .iter()
        .find(|c| lowered.contains(&c.name.to_lowercase()))
        .map(|c| c.name.clone());

    SpeechDraft { amount, category }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<Category> {
        ["Bills", "Food", "Travel"]
            .iter()
            .enumerate()
            .map(|(i, name)| Category {
                id: i as i64 + 1,
                name: name.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_amount_and_category() {
        let draft = parse("Spent 250 on FOOD today", &categories());
        assert_eq!(draft.amount, Some(Decimal::from(250)));
        assert_eq!(draft.category.as_deref(), Some("Food"));
        assert_eq!(draft.title(), "Voice Entry - Food");
    }

    #[test]
    fn test_first_number_wins_and_keeps_decimals() {
        let draft = parse("12.75 for travel and 3 for food", &categories());
        assert_eq!(draft.amount, Some(Decimal::from_str("12.75").unwrap()));
        assert_eq!(draft.category.as_deref(), Some("Food"));
    }

    #[test]
    fn test_missing_category_falls_back_to_other() {
        let draft = parse("paid 40", &categories());
        assert!(draft.category.is_none());
        assert_eq!(draft.title(), "Voice Entry - Other");
        assert_eq!(draft.label(), "Other");
    }

    #[test]
    fn test_no_amount() {
        let draft = parse("lunch with friends", &categories());
        assert!(draft.amount.is_none());
    }
}
