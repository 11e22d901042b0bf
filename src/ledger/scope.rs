//! Scope resolution over a recurring series and goal-sync planning.
//!
//! Both halves are pure: resolution maps (series, target, scope) to the
//! affected member set, and planning maps a pending mutation to the batched
//! synchronizer calls it requires. Storage effects happen elsewhere.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{RecurrenceScope, Transaction, TransactionKind};

/// A series fetched from storage: the head plus every generated child.
#[derive(Debug, Clone)]
pub struct SeriesSnapshot {
    pub head: Transaction,
    pub children: Vec<Transaction>,
}

impl SeriesSnapshot {
    pub fn members(&self) -> impl Iterator<Item = &Transaction> {
        std::iter::once(&self.head).chain(self.children.iter())
    }
}

/// Resolves which members of a series a scoped mutation applies to.
///
/// The head joins a `CurrentAndFuture` selection only when it is the target
/// itself or its date falls on/after the target's date; children qualify by
/// date alone. Results come back in ascending date order.
pub fn resolve_affected<'a>(
    series: &'a SeriesSnapshot,
    target: &Transaction,
    scope: RecurrenceScope,
) -> Vec<&'a Transaction> {
    let mut affected: Vec<&Transaction> = match scope {
        RecurrenceScope::CurrentOnly => {
            series.members().filter(|txn| txn.id == target.id).collect()
        }
        RecurrenceScope::CurrentAndFuture => series
            .members()
            .filter(|txn| txn.id == target.id || txn.date >= target.date)
            .collect(),
        RecurrenceScope::All => series.members().collect(),
    };
    affected.sort_by_key(|txn| (txn.date, txn.id));
    affected
}

/// One batched synchronizer invocation planned from a scoped mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalSync {
    /// Credit `value * count` for rows becoming paid.
    Credit {
        goal_id: Uuid,
        value: Decimal,
        count: usize,
    },
    /// Debit a summed amount for rows leaving the paid set.
    Debit { goal_id: Uuid, amount: Decimal },
    /// Re-base paid rows from one value to another in a single adjustment.
    Rebase {
        goal_id: Uuid,
        old_value: Decimal,
        new_value: Decimal,
        paid_count: usize,
    },
}

/// Plans the goal adjustments for an update over the affected set.
///
/// Only savings rows linked to the mutated entry's goal participate, split by
/// their current paid state. A paid-state flip credits the flipping unpaid
/// rows or debits the flipping paid rows at the pre-update value; a value
/// change re-bases the currently paid rows. Each planned item maps to exactly
/// one synchronizer call.
pub fn plan_goal_syncs(
    affected: &[&Transaction],
    existing: &Transaction,
    new_paid: Option<bool>,
    new_value: Option<Decimal>,
) -> Vec<GoalSync> {
    if existing.kind != TransactionKind::Savings {
        return Vec::new();
    }
    let Some(goal_id) = existing.goal_id else {
        return Vec::new();
    };
    let pool: Vec<&&Transaction> = affected
        .iter()
        .filter(|txn| txn.goal_id == Some(goal_id))
        .collect();
    let paid = pool.iter().filter(|txn| txn.is_settled()).count();
    let unpaid = pool.len() - paid;

    let mut syncs = Vec::new();
    if let Some(flag) = new_paid {
        if flag {
            if unpaid > 0 {
                syncs.push(GoalSync::Credit {
                    goal_id,
                    value: existing.value,
                    count: unpaid,
                });
            }
        } else if paid > 0 {
            syncs.push(GoalSync::Debit {
                goal_id,
                amount: existing.value * Decimal::from(paid as u64),
            });
        }
    }
    if let Some(value) = new_value {
        if value != existing.value && paid > 0 {
            syncs.push(GoalSync::Rebase {
                goal_id,
                old_value: existing.value,
                new_value: value,
                paid_count: paid,
            });
        }
    }
    syncs
}

/// Plans the goal debits for a delete over the affected set: one summed debit
/// per distinct goal across the paid savings rows.
pub fn plan_goal_refunds(affected: &[&Transaction]) -> Vec<GoalSync> {
    let mut by_goal: BTreeMap<Uuid, Decimal> = BTreeMap::new();
    for txn in affected {
        if txn.kind != TransactionKind::Savings || !txn.is_settled() {
            continue;
        }
        if let Some(goal_id) = txn.goal_id {
            *by_goal.entry(goal_id).or_insert(Decimal::ZERO) += txn.value;
        }
    }
    by_goal
        .into_iter()
        .filter(|(_, amount)| !amount.is_zero())
        .map(|(goal_id, amount)| GoalSync::Debit { goal_id, amount })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn savings_series(paid: bool, occurrences: usize) -> (SeriesSnapshot, Uuid) {
        let owner = Uuid::new_v4();
        let goal_id = Uuid::new_v4();
        let head = Transaction::new(
            owner,
            "Saving to Vacation",
            date(2024, 1, 10),
            Decimal::from(100),
            TransactionKind::Savings,
        )
        .with_goal(goal_id)
        .with_recurrence(Some(crate::domain::RecurrenceUnit::Monthly), None, None)
        .with_payment(paid, Some(false));
        let children = (1..occurrences)
            .map(|n| head.child_occurrence(date(2024, 1 + n as u32, 10)))
            .collect();
        (SeriesSnapshot { head, children }, goal_id)
    }

    #[test]
    fn current_only_selects_exactly_the_target() {
        let (series, _) = savings_series(true, 6);
        let target = series.children[2].clone();
        let affected = resolve_affected(&series, &target, RecurrenceScope::CurrentOnly);
        assert_eq!(affected.len(), 1);
        assert_eq!(affected[0].id, target.id);
    }

    #[test]
    fn current_and_future_excludes_the_head_before_the_target() {
        let (series, _) = savings_series(true, 6);
        // Third occurrence of six: the head and the first child stay put.
        let target = series.children[1].clone();
        let affected = resolve_affected(&series, &target, RecurrenceScope::CurrentAndFuture);
        assert_eq!(affected.len(), 4);
        assert!(affected.iter().all(|txn| txn.date >= target.date));
        assert!(!affected.iter().any(|txn| txn.id == series.head.id));
    }

    #[test]
    fn current_and_future_from_the_head_takes_everything() {
        let (series, _) = savings_series(true, 6);
        let target = series.head.clone();
        let affected = resolve_affected(&series, &target, RecurrenceScope::CurrentAndFuture);
        assert_eq!(affected.len(), 6);
    }

    #[test]
    fn all_scope_is_unconditional() {
        let (series, _) = savings_series(true, 6);
        let target = series.children[4].clone();
        let affected = resolve_affected(&series, &target, RecurrenceScope::All);
        assert_eq!(affected.len(), 6);
    }

    #[test]
    fn value_change_rebases_only_paid_rows() {
        let (series, goal_id) = savings_series(true, 6);
        let target = series.head.clone();
        let affected = resolve_affected(&series, &target, RecurrenceScope::All);
        let syncs = plan_goal_syncs(&affected, &target, None, Some(Decimal::from(150)));
        assert_eq!(
            syncs,
            vec![GoalSync::Rebase {
                goal_id,
                old_value: Decimal::from(100),
                new_value: Decimal::from(150),
                paid_count: 6,
            }]
        );
    }

    #[test]
    fn value_change_on_unpaid_rows_plans_nothing() {
        let (series, _) = savings_series(false, 3);
        let target = series.head.clone();
        let affected = resolve_affected(&series, &target, RecurrenceScope::All);
        assert!(plan_goal_syncs(&affected, &target, None, Some(Decimal::from(150))).is_empty());
    }

    #[test]
    fn paid_flip_credits_unpaid_rows_at_the_old_value() {
        let (series, goal_id) = savings_series(false, 4);
        let target = series.head.clone();
        let affected = resolve_affected(&series, &target, RecurrenceScope::All);
        let syncs = plan_goal_syncs(&affected, &target, Some(true), None);
        assert_eq!(
            syncs,
            vec![GoalSync::Credit {
                goal_id,
                value: Decimal::from(100),
                count: 4,
            }]
        );
    }

    #[test]
    fn unpaid_flip_debits_the_paid_subset() {
        let (series, goal_id) = savings_series(true, 4);
        let target = series.head.clone();
        let affected = resolve_affected(&series, &target, RecurrenceScope::All);
        let syncs = plan_goal_syncs(&affected, &target, Some(false), None);
        assert_eq!(
            syncs,
            vec![GoalSync::Debit {
                goal_id,
                amount: Decimal::from(400),
            }]
        );
    }

    #[test]
    fn refund_planning_groups_by_goal() {
        let (series, goal_id) = savings_series(true, 3);
        let target = series.children[0].clone();
        let affected = resolve_affected(&series, &target, RecurrenceScope::CurrentAndFuture);
        let refunds = plan_goal_refunds(&affected);
        assert_eq!(
            refunds,
            vec![GoalSync::Debit {
                goal_id,
                amount: Decimal::from(200),
            }]
        );
    }

    #[test]
    fn refund_planning_skips_unpaid_rows() {
        let (series, _) = savings_series(false, 3);
        let target = series.head.clone();
        let affected = resolve_affected(&series, &target, RecurrenceScope::All);
        assert!(plan_goal_refunds(&affected).is_empty());
    }
}
