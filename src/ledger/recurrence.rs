//! Occurrence date math for recurring series.

use chrono::{Datelike, Duration, NaiveDate};

use crate::domain::RecurrenceUnit;

/// Number of generated occurrences when a series carries no explicit total.
pub const DEFAULT_SERIES_CAP: u32 = 12;

/// Computes the date of the `n`-th occurrence after `base`, `n >= 1`.
///
/// Monthly and yearly steps clamp the day-of-month to the last valid day of
/// the target month (Jan 31 + 1 month lands on Feb 28/29, not Mar 3). Offsets
/// are always taken from `base`, so the clamp never compounds across steps.
pub fn next_occurrence(base: NaiveDate, unit: RecurrenceUnit, n: u32) -> NaiveDate {
    match unit {
        RecurrenceUnit::Daily => base + Duration::days(n as i64),
        RecurrenceUnit::Weekly => base + Duration::days(7 * n as i64),
        RecurrenceUnit::Monthly => shift_months(base, n as i32),
        RecurrenceUnit::Yearly => shift_years(base, n as i32),
    }
}

/// Generates the occurrence dates strictly after `start`, in ascending order.
///
/// Stops at whichever bound is hit first: `max_occurrences` generated, or the
/// next date passing the inclusive `end_date`. Empty when the first occurrence
/// already overshoots.
pub fn expand(
    start: NaiveDate,
    unit: RecurrenceUnit,
    end_date: Option<NaiveDate>,
    max_occurrences: u32,
) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    for n in 1..=max_occurrences {
        let next = next_occurrence(start, unit, n);
        if let Some(end) = end_date {
            if next > end {
                break;
            }
        }
        dates.push(next);
    }
    dates
}

pub(crate) fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let index = date.year() * 12 + date.month() as i32 - 1 + months;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

fn shift_years(date: NaiveDate, years: i32) -> NaiveDate {
    let year = date.year() + years;
    let day = date.day().min(days_in_month(year, date.month()));
    NaiveDate::from_ymd_opt(year, date.month(), day).unwrap_or(date)
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    let last_current = first_next - Duration::days(1);
    last_current.day()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn daily_and_weekly_steps() {
        let base = date(2024, 3, 1);
        assert_eq!(next_occurrence(base, RecurrenceUnit::Daily, 3), date(2024, 3, 4));
        assert_eq!(next_occurrence(base, RecurrenceUnit::Weekly, 2), date(2024, 3, 15));
    }

    #[test]
    fn monthly_clamps_to_month_end() {
        let base = date(2024, 1, 31);
        assert_eq!(next_occurrence(base, RecurrenceUnit::Monthly, 1), date(2024, 2, 29));
        assert_eq!(next_occurrence(base, RecurrenceUnit::Monthly, 3), date(2024, 4, 30));
        let base = date(2023, 1, 31);
        assert_eq!(next_occurrence(base, RecurrenceUnit::Monthly, 1), date(2023, 2, 28));
    }

    #[test]
    fn monthly_offsets_do_not_compound_the_clamp() {
        // Iterating single steps drags the day down through February, while a
        // direct two-step offset keeps the original day-of-month.
        let base = date(2024, 1, 31);
        let iterated = next_occurrence(
            next_occurrence(base, RecurrenceUnit::Monthly, 1),
            RecurrenceUnit::Monthly,
            1,
        );
        assert_eq!(iterated, date(2024, 3, 29));
        assert_eq!(next_occurrence(base, RecurrenceUnit::Monthly, 2), date(2024, 3, 31));
    }

    #[test]
    fn yearly_clamps_leap_day() {
        let base = date(2024, 2, 29);
        assert_eq!(next_occurrence(base, RecurrenceUnit::Yearly, 1), date(2025, 2, 28));
        assert_eq!(next_occurrence(base, RecurrenceUnit::Yearly, 4), date(2028, 2, 29));
    }

    #[test]
    fn occurrences_are_monotonic_in_n() {
        let base = date(2024, 1, 31);
        for unit in [
            RecurrenceUnit::Daily,
            RecurrenceUnit::Weekly,
            RecurrenceUnit::Monthly,
            RecurrenceUnit::Yearly,
        ] {
            let mut previous = base;
            for n in 1..=24 {
                let next = next_occurrence(base, unit, n);
                assert!(next > previous, "{unit} occurrence {n} must advance");
                previous = next;
            }
        }
    }

    #[test]
    fn expand_produces_a_full_monthly_year() {
        let dates = expand(date(2024, 1, 31), RecurrenceUnit::Monthly, None, 12);
        assert_eq!(dates.len(), 12);
        assert_eq!(dates[0], date(2024, 2, 29));
        assert_eq!(dates[1], date(2024, 3, 31));
        assert_eq!(dates[11], date(2025, 1, 31));
    }

    #[test]
    fn expand_end_date_boundary_is_inclusive() {
        let dates = expand(
            date(2024, 1, 15),
            RecurrenceUnit::Monthly,
            Some(date(2024, 4, 15)),
            12,
        );
        assert_eq!(dates, vec![date(2024, 2, 15), date(2024, 3, 15), date(2024, 4, 15)]);
    }

    #[test]
    fn expand_is_empty_when_first_occurrence_overshoots() {
        let dates = expand(
            date(2024, 1, 15),
            RecurrenceUnit::Monthly,
            Some(date(2024, 2, 1)),
            12,
        );
        assert!(dates.is_empty());
    }

    #[test]
    fn expansion_honors_both_bounds_whichever_first() {
        // An occurrence cap and an end date may both be set; the earlier bound
        // wins. Three allowed steps against a cap of 10, then a cap of 2
        // against a distant end date.
        let by_end = expand(
            date(2024, 1, 1),
            RecurrenceUnit::Monthly,
            Some(date(2024, 4, 1)),
            10,
        );
        assert_eq!(by_end.len(), 3);
        let by_cap = expand(
            date(2024, 1, 1),
            RecurrenceUnit::Monthly,
            Some(date(2030, 1, 1)),
            2,
        );
        assert_eq!(by_cap.len(), 2);
    }
}
