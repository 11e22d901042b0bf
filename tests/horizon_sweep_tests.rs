mod common;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use common::*;
use ledger_core::core::services::{HorizonService, NewEntry, TransactionService};
use ledger_core::domain::RecurrenceUnit;
use ledger_core::storage::Storage;
use ledger_core::time::Clock;

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn clock_at(year: i32, month: u32, day: u32) -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap())
}

#[test]
fn sweep_extends_a_short_series_to_the_horizon() {
    let (store, owner) = store_with_owner();
    let head = bill_series(&store, owner, date(2024, 1, 1), 900, 3);
    assert_eq!(children_of(&store, &head).len(), 2);

    let summary = HorizonService::extend_series(&store, &clock_at(2024, 3, 15));
    assert_eq!(summary.heads, 1);
    assert_eq!(summary.failures, 0);
    assert_eq!(summary.created, 12);

    let children = children_of(&store, &head);
    let last: NaiveDate = children.last().unwrap().date;
    assert_eq!(last, date(2025, 3, 1));
}

#[test]
fn repeated_sweeps_converge_without_duplicates() {
    let (store, owner) = store_with_owner();
    let head = bill_series(&store, owner, date(2024, 1, 1), 900, 3);
    let clock = clock_at(2024, 3, 15);

    for _ in 0..4 {
        HorizonService::extend_series(&store, &clock);
    }
    let settled = HorizonService::extend_series(&store, &clock);
    assert_eq!(settled.created, 0);

    let mut dates: Vec<NaiveDate> = children_of(&store, &head)
        .iter()
        .map(|child| child.date)
        .collect();
    let len_before = dates.len();
    dates.dedup();
    assert_eq!(dates.len(), len_before, "no duplicate occurrence dates");
    assert!(dates.iter().all(|d| *d <= date(2025, 3, 15)));
}

#[test]
fn sweep_respects_the_series_end_date() {
    let (store, owner) = store_with_owner();
    let mut entry = NewEntry::once("Lease", date(2024, 1, 1), money(700))
        .recurring(RecurrenceUnit::Monthly);
    entry.recurrence_count = Some(2);
    entry.recurrence_end_date = Some(date(2024, 4, 1));
    let head = TransactionService::create_bill(&store, owner, entry).unwrap();

    let summary = HorizonService::extend_series(&store, &clock_at(2024, 2, 15));
    assert_eq!(summary.failures, 0);
    let children = children_of(&store, &head);
    assert_eq!(children.last().unwrap().date, date(2024, 4, 1));

    // A later sweep past the end date leaves the series alone.
    let summary = HorizonService::extend_series(&store, &clock_at(2024, 6, 1));
    assert_eq!(summary.created, 0);
}

#[test]
fn sweep_credits_goals_for_new_paid_savings_children() {
    let (store, owner) = store_with_owner();
    let goal = seeded_goal(&store, owner, 10_000);
    paid_savings_series(&store, owner, goal.id, date(2024, 1, 10), 100, 2);
    assert_eq!(goal_amount(&store, goal.id), money(200));

    let summary = HorizonService::extend_series(&store, &clock_at(2024, 2, 20));
    assert_eq!(summary.failures, 0);
    assert!(summary.created > 0);
    assert_eq!(
        goal_amount(&store, goal.id),
        money(200) + money(100 * summary.created as i64)
    );
}

#[test]
fn one_broken_series_does_not_starve_the_rest() {
    let (store, owner) = store_with_owner();
    let goal = seeded_goal(&store, owner, 10_000);
    paid_savings_series(&store, owner, goal.id, date(2024, 1, 10), 100, 2);
    let healthy = bill_series(&store, owner, date(2024, 1, 1), 900, 2);

    // Sever the savings head's goal so its extension fails mid-processing.
    store.delete_savings_goal(goal.id).unwrap();

    let summary = HorizonService::extend_series(&store, &clock_at(2024, 2, 20));
    assert_eq!(summary.heads, 2);
    assert_eq!(summary.failures, 1, "the orphaned savings head fails");
    assert!(
        children_of(&store, &healthy).len() > 1,
        "the healthy series still extends"
    );
}

#[test]
fn series_already_at_the_horizon_are_left_alone() {
    let (store, owner) = store_with_owner();
    // Default materialization already reaches twelve months out.
    bill_series(&store, owner, date(2024, 3, 1), 900, 13);

    let summary = HorizonService::extend_series(&store, &clock_at(2024, 3, 2));
    assert_eq!(summary.created, 0);
}
