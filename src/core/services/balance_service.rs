//! Monthly balance snapshots: lazy computation on read, synchronous
//! recomputation on invalidation.
//!
//! The two paths chain differently on purpose. A read links the previous
//! month's cached balance into the result; invalidation rewrites the month
//! from its own transactions only, leaving the cross-month chain to the next
//! read. Smoothing this into one path would change observable balances.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{KindTotals, MonthlyBalance, MonthlyBalanceSnapshot};
use crate::ledger::{month_span, previous_month};
use crate::storage::{Result, Storage, TransactionFilter};

/// Reads and maintains the per-month aggregate cache.
pub struct BalanceService;

impl BalanceService {
    /// Returns the month's balance view, computing and caching it on first
    /// read.
    ///
    /// The previous month's balance is looked up one level from cache only;
    /// it stays `None` when that month has never been computed.
    pub fn monthly_balance(
        store: &dyn Storage,
        owner: Uuid,
        year: i32,
        month: u32,
    ) -> Result<MonthlyBalance> {
        let span = month_span(year, month)?;
        if let Some(snapshot) = store.balance_snapshot(owner, year, month)? {
            let previous = Self::previous_cached_balance(store, owner, year, month)?;
            return Ok(MonthlyBalance {
                year,
                month,
                totals: snapshot.totals,
                balance: snapshot.balance,
                previous_month_balance: previous,
            });
        }

        let rows = store.transactions(&TransactionFilter::owned_by(owner).with_span(span))?;
        let totals = KindTotals::aggregate(&rows);
        let previous = Self::previous_cached_balance(store, owner, year, month)?;
        let balance = previous.unwrap_or(Decimal::ZERO) + totals.delta();
        store.upsert_balance_snapshot(MonthlyBalanceSnapshot {
            owner,
            year,
            month,
            totals: totals.clone(),
            balance,
        })?;
        Ok(MonthlyBalance {
            year,
            month,
            totals,
            balance,
            previous_month_balance: previous,
        })
    }

    /// The balance view for the month preceding `today`.
    pub fn previous_month_balance(
        store: &dyn Storage,
        owner: Uuid,
        today: NaiveDate,
    ) -> Result<MonthlyBalance> {
        let (year, month) = previous_month(today.year(), today.month());
        Self::monthly_balance(store, owner, year, month)
    }

    /// Recomputes the month's totals from the ledger and replaces the
    /// snapshot wholesale. The written balance is the month's own delta; the
    /// previous month is not consulted on this path.
    pub fn invalidate_month(
        store: &dyn Storage,
        owner: Uuid,
        year: i32,
        month: u32,
    ) -> Result<()> {
        let span = month_span(year, month)?;
        let rows = store.transactions(&TransactionFilter::owned_by(owner).with_span(span))?;
        let totals = KindTotals::aggregate(&rows);
        let balance = totals.delta();
        store.upsert_balance_snapshot(MonthlyBalanceSnapshot {
            owner,
            year,
            month,
            totals,
            balance,
        })
    }

    /// Invalidates every listed (year, month) pair.
    pub fn invalidate_months(
        store: &dyn Storage,
        owner: Uuid,
        months: impl IntoIterator<Item = (i32, u32)>,
    ) -> Result<()> {
        for (year, month) in months {
            Self::invalidate_month(store, owner, year, month)?;
        }
        Ok(())
    }

    fn previous_cached_balance(
        store: &dyn Storage,
        owner: Uuid,
        year: i32,
        month: u32,
    ) -> Result<Option<Decimal>> {
        let (prev_year, prev_month) = previous_month(year, month);
        Ok(store
            .balance_snapshot(owner, prev_year, prev_month)?
            .map(|snapshot| snapshot.balance))
    }
}
