//! Query parameter extractors for list endpoints.

use serde::Deserialize;

use tally_types::expense::{DateRange, ExpenseFilter, ExpenseSort};

use crate::http::error::AppError;

/// Query parameters for the expense list and dashboard endpoints.
///
/// Empty values (as sent by HTML forms) are treated as absent.
#[derive(Debug, Deserialize, Default)]
pub struct ExpenseListQuery {
    pub category: Option<String>,
    /// `today`, `week`, or `month`.
    pub date_range: Option<String>,
    /// Case-insensitive title substring.
    pub search: Option<String>,
    /// `newest` (default), `oldest`, `high`, or `low`.
    pub sort_by: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ExpenseListQuery {
    /// Parse into a typed filter, rejecting unknown range or sort values.
    pub fn into_filter(self) -> Result<ExpenseFilter, AppError> {
        let date_range = present(&self.date_range)
            .map(|v| v.parse::<DateRange>())
            .transpose()
            .map_err(AppError::Validation)?;
        let sort = present(&self.sort_by)
            .map(|v| v.parse::<ExpenseSort>())
            .transpose()
            .map_err(AppError::Validation)?
            .unwrap_or_default();

        Ok(ExpenseFilter {
            category: present(&self.category).map(String::from),
            date_range,
            search: present(&self.search).map(String::from),
            sort,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_are_ignored() {
        let query = ExpenseListQuery {
            category: Some("".to_string()),
            date_range: Some(" ".to_string()),
            search: None,
            sort_by: Some("".to_string()),
        };
        let filter = query.into_filter().unwrap();
        assert!(filter.category.is_none());
        assert!(filter.date_range.is_none());
        assert_eq!(filter.sort, ExpenseSort::Newest);
    }

    #[test]
    fn test_values_are_parsed() {
        let query = ExpenseListQuery {
            category: Some("Food".to_string()),
            date_range: Some("week".to_string()),
            search: Some("lunch".to_string()),
            sort_by: Some("high".to_string()),
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.category.as_deref(), Some("Food"));
        assert_eq!(filter.date_range, Some(DateRange::Week));
        assert_eq!(filter.sort, ExpenseSort::High);
    }

    #[test]
    fn test_unknown_sort_is_rejected() {
        let query = ExpenseListQuery {
            sort_by: Some("alphabetical".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.into_filter(), Err(AppError::Validation(_))));
    }
}
