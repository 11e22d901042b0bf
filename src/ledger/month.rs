//! Month keys and calendar spans used by balance caching and queries.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};

use crate::domain::DateSpan;
use crate::errors::CoreError;

use super::recurrence::{days_in_month, shift_months};

/// The (year, month) key of a date.
pub fn month_of(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

/// Inclusive first-to-last-day span of a calendar month.
pub fn month_span(year: i32, month: u32) -> Result<DateSpan, CoreError> {
    if !(1..=12).contains(&month) {
        return Err(CoreError::InvalidArgument(format!(
            "month must be between 1 and 12, got {month}"
        )));
    }
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| CoreError::InvalidArgument(format!("invalid year {year}")))?;
    let end = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))
        .ok_or_else(|| CoreError::InvalidArgument(format!("invalid year {year}")))?;
    Ok(DateSpan::new(start, end))
}

/// The (year, month) immediately preceding the given one.
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Collects the distinct months a set of dates falls into, in ascending order.
pub fn months_touched(dates: impl IntoIterator<Item = NaiveDate>) -> BTreeSet<(i32, u32)> {
    dates.into_iter().map(month_of).collect()
}

/// The date a number of months ahead, with the usual day clamping.
pub fn months_ahead(date: NaiveDate, months: u32) -> NaiveDate {
    shift_months(date, months as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DateSpan;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn month_span_covers_whole_month_inclusive() {
        let span = month_span(2024, 2).unwrap();
        assert_eq!(span, DateSpan::new(date(2024, 2, 1), date(2024, 2, 29)));
        assert!(span.contains(date(2024, 2, 29)));
        assert!(!span.contains(date(2024, 3, 1)));
    }

    #[test]
    fn month_span_rejects_out_of_range_months() {
        assert!(matches!(
            month_span(2024, 0),
            Err(CoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            month_span(2024, 13),
            Err(CoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn previous_month_wraps_the_year() {
        assert_eq!(previous_month(2024, 1), (2023, 12));
        assert_eq!(previous_month(2024, 7), (2024, 6));
    }

    #[test]
    fn months_touched_deduplicates() {
        let months = months_touched(vec![
            date(2024, 1, 5),
            date(2024, 1, 31),
            date(2024, 3, 2),
        ]);
        assert_eq!(months.into_iter().collect::<Vec<_>>(), vec![(2024, 1), (2024, 3)]);
    }
}
