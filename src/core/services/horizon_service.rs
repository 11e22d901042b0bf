//! Daily sweep keeping every open series materialized up to the rolling
//! horizon.

use chrono::NaiveDate;
use tracing::{error, info};

use crate::core::services::SavingsGoalService;
use crate::domain::{Transaction, TransactionKind};
use crate::ledger::{expand, months_ahead, next_occurrence, DEFAULT_SERIES_CAP};
use crate::storage::{Result, Storage, TransactionFilter};
use crate::time::Clock;

/// Rolling future window, in months, up to which series stay materialized.
pub const HORIZON_MONTHS: u32 = 12;

/// Outcome counts for one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub heads: usize,
    pub created: usize,
    pub failures: usize,
}

/// Extends recurring series on a schedule.
pub struct HorizonService;

impl HorizonService {
    /// Extends every series head up to the horizon.
    ///
    /// Each head runs inside its own error boundary: a failure is logged and
    /// counted, and the sweep continues with the next head. The sweep itself
    /// never fails.
    pub fn extend_series(store: &dyn Storage, clock: &dyn Clock) -> SweepSummary {
        let today = clock.today();
        let horizon = months_ahead(today, HORIZON_MONTHS);
        info!("Starting horizon sweep.");

        let heads = match store.transactions(&TransactionFilter {
            heads_only: true,
            ..Default::default()
        }) {
            Ok(heads) => heads,
            Err(err) => {
                error!("Failed to list series heads: {err}");
                return SweepSummary::default();
            }
        };

        let mut summary = SweepSummary {
            heads: heads.len(),
            ..Default::default()
        };
        for head in &heads {
            match Self::extend_head(store, head, today, horizon) {
                Ok(created) => summary.created += created,
                Err(err) => {
                    summary.failures += 1;
                    error!(head = %head.id, "Failed to extend series: {err}");
                }
            }
        }
        info!(
            heads = summary.heads,
            created = summary.created,
            failures = summary.failures,
            "Horizon sweep finished."
        );
        summary
    }

    /// Extends one series, returning the number of occurrences created.
    ///
    /// Expansion anchors on the most recent existing child (or the head when
    /// none exist). A child already present at the next computed date means a
    /// previous sweep got here; the guard keeps repeated runs from ever
    /// duplicating occurrences.
    fn extend_head(
        store: &dyn Storage,
        head: &Transaction,
        today: NaiveDate,
        horizon: NaiveDate,
    ) -> Result<usize> {
        let Some(unit) = head.recurrence else {
            return Ok(0);
        };
        if head.recurrence_end_date.is_some_and(|end| end < today) {
            return Ok(0);
        }

        let children =
            store.transactions(&TransactionFilter::owned_by(head.owner).with_parent(head.id))?;
        let anchor = children.last().map(|child| child.date).unwrap_or(head.date);
        let next = next_occurrence(anchor, unit, 1);
        if head.recurrence_end_date.is_some_and(|end| next > end) || next > horizon {
            return Ok(0);
        }
        if children.iter().any(|child| child.date == next) {
            return Ok(0);
        }

        let dates: Vec<NaiveDate> =
            expand(anchor, unit, head.recurrence_end_date, DEFAULT_SERIES_CAP)
                .into_iter()
                .filter(|date| *date <= horizon)
                .collect();
        if dates.is_empty() {
            return Ok(0);
        }
        let created = dates.len();
        let new_children: Vec<Transaction> = dates
            .into_iter()
            .map(|date| head.child_occurrence(date))
            .collect();
        store.insert_transactions(new_children)?;

        if head.kind == TransactionKind::Savings && head.is_settled() {
            if let Some(goal_id) = head.goal_id {
                SavingsGoalService::add_to_goal(store, goal_id, head.value, created)?;
            }
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::transaction_service::{NewEntry, TransactionService};
    use crate::domain::RecurrenceUnit;
    use crate::storage::memory::MemoryStore;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn clock(year: i32, month: u32, day: u32) -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap())
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn sweep_converges_and_never_duplicates() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let mut entry = NewEntry::once("Rent", date(2024, 1, 1), Decimal::from(900))
            .recurring(RecurrenceUnit::Monthly);
        entry.recurrence_count = Some(3);
        let head = TransactionService::create_bill(&store, owner, entry).unwrap();

        let clock = clock(2024, 6, 15);
        for _ in 0..4 {
            assert_eq!(HorizonService::extend_series(&store, &clock).failures, 0);
        }
        let settled = HorizonService::extend_series(&store, &clock);
        assert_eq!(settled.created, 0, "a settled sweep must not duplicate");

        let children = store
            .transactions(&TransactionFilter::owned_by(owner).with_parent(head.id))
            .unwrap();
        let mut dates: Vec<NaiveDate> = children.iter().map(|child| child.date).collect();
        dates.dedup();
        assert_eq!(dates.len(), children.len());
        assert!(dates.iter().all(|d| *d <= date(2025, 6, 15)));
    }

    #[test]
    fn expired_series_are_skipped() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let mut entry = NewEntry::once("Lease", date(2023, 1, 1), Decimal::from(700))
            .recurring(RecurrenceUnit::Monthly);
        entry.recurrence_end_date = Some(date(2023, 6, 1));
        TransactionService::create_bill(&store, owner, entry).unwrap();

        let summary = HorizonService::extend_series(&store, &clock(2024, 3, 1));
        assert_eq!(summary.heads, 1);
        assert_eq!(summary.created, 0);
    }
}
