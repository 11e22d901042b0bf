//! Listing queries over the ledger, grouped by entry kind family.

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::domain::{DateSpan, Transaction, TransactionKind};
use crate::errors::CoreError;
use crate::ledger::{month_span, months_touched};
use crate::storage::{Result, Storage, TransactionFilter};

/// Optional month restriction for listing queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl MonthQuery {
    pub fn for_month(year: i32, month: u32) -> Self {
        Self {
            year: Some(year),
            month: Some(month),
        }
    }

    /// Resolves the restriction: a year without a month is invalid, a month
    /// without a year assumes the current year, and neither means
    /// unrestricted.
    pub fn normalize(&self, today: NaiveDate) -> Result<Option<(i32, u32)>> {
        match (self.year, self.month) {
            (Some(_), None) => Err(CoreError::InvalidArgument(
                "month is required when year is provided".into(),
            )),
            (None, Some(month)) => Ok(Some((today.year(), month))),
            (Some(year), Some(month)) => Ok(Some((year, month))),
            (None, None) => Ok(None),
        }
    }

    pub(crate) fn span(&self, today: NaiveDate) -> Result<Option<DateSpan>> {
        self.normalize(today)?
            .map(|(year, month)| month_span(year, month))
            .transpose()
    }
}

/// Read-only listings over a user's transactions.
pub struct QueryService;

impl QueryService {
    pub fn income(
        store: &dyn Storage,
        owner: Uuid,
        query: &MonthQuery,
        today: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        Self::by_kinds(store, owner, &[TransactionKind::Income], query, today)
    }

    pub fn bills(
        store: &dyn Storage,
        owner: Uuid,
        query: &MonthQuery,
        today: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        Self::by_kinds(store, owner, &[TransactionKind::Bill], query, today)
    }

    pub fn subscriptions(
        store: &dyn Storage,
        owner: Uuid,
        query: &MonthQuery,
        today: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        Self::by_kinds(store, owner, &[TransactionKind::Subscription], query, today)
    }

    pub fn savings(
        store: &dyn Storage,
        owner: Uuid,
        query: &MonthQuery,
        today: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        Self::by_kinds(store, owner, &[TransactionKind::Savings], query, today)
    }

    /// Expenses and refunds are listed together; they share a screen in every
    /// consumer.
    pub fn expenses_and_refunds(
        store: &dyn Storage,
        owner: Uuid,
        query: &MonthQuery,
        today: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        Self::by_kinds(
            store,
            owner,
            &[TransactionKind::Expense, TransactionKind::Refund],
            query,
            today,
        )
    }

    /// Distinct (year, month) pairs holding any of the user's transactions,
    /// newest first.
    pub fn available_months(store: &dyn Storage, owner: Uuid) -> Result<Vec<(i32, u32)>> {
        let rows = store.transactions(&TransactionFilter::owned_by(owner))?;
        let mut months: Vec<(i32, u32)> = months_touched(rows.iter().map(|txn| txn.date))
            .into_iter()
            .collect();
        months.reverse();
        Ok(months)
    }

    fn by_kinds(
        store: &dyn Storage,
        owner: Uuid,
        kinds: &[TransactionKind],
        query: &MonthQuery,
        today: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        let mut filter = TransactionFilter::owned_by(owner).with_kinds(kinds);
        if let Some(span) = query.span(today)? {
            filter = filter.with_span(span);
        }
        let mut rows = store.transactions(&filter)?;
        rows.reverse();
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn year_without_month_is_invalid() {
        let query = MonthQuery {
            year: Some(2024),
            month: None,
        };
        let err = query.normalize(date(2024, 6, 1)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }

    #[test]
    fn month_without_year_assumes_the_current_year() {
        let query = MonthQuery {
            year: None,
            month: Some(2),
        };
        assert_eq!(query.normalize(date(2025, 6, 1)).unwrap(), Some((2025, 2)));
    }

    #[test]
    fn empty_query_means_unrestricted() {
        assert_eq!(MonthQuery::default().normalize(date(2025, 6, 1)).unwrap(), None);
    }
}
