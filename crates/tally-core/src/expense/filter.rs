//! Resolve a user-facing filter into a concrete storage query.

use chrono::{Datelike, Duration, NaiveDate};

use tally_types::expense::{DateRange, ExpenseFilter, ExpenseQuery};

/// First day of the month containing `day`.
pub fn month_start(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// Last day of the month containing `day`.
pub fn month_end(day: NaiveDate) -> NaiveDate {
    let (year, month) = if day.month() == 12 {
        (day.year() + 1, 1)
    } else {
        (day.year(), day.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(day)
}

/// Monday of the week containing `day`.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

/// Inclusive `(start, end)` bounds for a date range relative to `today`.
///
/// `week` reaches seven days back and has no upper bound, so future-dated
/// expenses are included, matching a plain `date >= today - 7` filter.
pub fn date_bounds(range: DateRange, today: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
    match range {
        DateRange::Today => (Some(today), Some(today)),
        DateRange::Week => (Some(today - Duration::days(7)), None),
        DateRange::Month => (Some(month_start(today)), Some(month_end(today))),
    }
}

/// Turn a filter into a query. Blank category and search strings are ignored.
pub fn resolve(filter: &ExpenseFilter, today: NaiveDate) -> ExpenseQuery {
    let (start, end) = filter
        .date_range
        .map(|range| date_bounds(range, today))
        .unwrap_or((None, None));

    ExpenseQuery {
        category: non_blank(filter.category.as_deref()),
        start,
        end,
        search: non_blank(filter.search.as_deref()),
        sort: filter.sort,
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_types::expense::ExpenseSort;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_today_bounds() {
        let today = d(2024, 3, 15);
        assert_eq!(date_bounds(DateRange::Today, today), (Some(today), Some(today)));
    }

    #[test]
    fn test_week_reaches_seven_days_back() {
        let today = d(2024, 3, 5);
        assert_eq!(date_bounds(DateRange::Week, today), (Some(d(2024, 2, 27)), None));
    }

    #[test]
    fn test_month_bounds_handle_year_end_and_leap_years() {
        assert_eq!(
            date_bounds(DateRange::Month, d(2024, 12, 20)),
            (Some(d(2024, 12, 1)), Some(d(2024, 12, 31)))
        );
        assert_eq!(
            date_bounds(DateRange::Month, d(2024, 2, 10)),
            (Some(d(2024, 2, 1)), Some(d(2024, 2, 29)))
        );
    }

    #[test]
    fn test_week_start_is_monday() {
        // 2024-03-14 is a Thursday.
        assert_eq!(week_start(d(2024, 3, 14)), d(2024, 3, 11));
        assert_eq!(week_start(d(2024, 3, 11)), d(2024, 3, 11));
        assert_eq!(week_start(d(2024, 3, 17)), d(2024, 3, 11));
    }

    #[test]
    fn test_resolve_drops_blank_strings() {
        let filter = ExpenseFilter {
            category: Some("  ".to_string()),
            date_range: None,
            search: Some(" taxi ".to_string()),
            sort: ExpenseSort::High,
        };
        let query = resolve(&filter, d(2024, 1, 1));
        assert!(query.category.is_none());
        assert_eq!(query.search.as_deref(), Some("taxi"));
        assert_eq!(query.sort, ExpenseSort::High);
        assert!(query.start.is_none() && query.end.is_none());
    }
}
