//! Savings goals: CRUD plus the synchronizer keeping `current_amount` equal
//! to the summed value of the goal's paid contributions.
//!
//! Every synchronizer operation is an atomic increment against storage.
//! Callers pre-filter to paid rows; nothing here re-derives the paid state.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::services::{owned_goal, MonthQuery};
use crate::domain::{GoalChanges, SavingsGoal, Transaction};
use crate::ledger::GoalSync;
use crate::storage::{Result, Storage, TransactionFilter};

/// Goal CRUD and the goal-amount synchronizer.
pub struct SavingsGoalService;

impl SavingsGoalService {
    /// Credits `value * count` for newly paid contributions.
    pub fn add_to_goal(
        store: &dyn Storage,
        goal_id: Uuid,
        value: Decimal,
        count: usize,
    ) -> Result<()> {
        let delta = value * Decimal::from(count as u64);
        if delta.is_zero() {
            return Ok(());
        }
        store.add_to_goal_amount(goal_id, delta)
    }

    /// Debits a summed amount for contributions leaving the paid set.
    pub fn subtract_from_goal(store: &dyn Storage, goal_id: Uuid, amount: Decimal) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }
        store.add_to_goal_amount(goal_id, -amount)
    }

    /// Moves one paid contribution from its old value to a new one.
    pub fn adjust_for_value_change(
        store: &dyn Storage,
        goal_id: Uuid,
        old_value: Decimal,
        new_value: Decimal,
    ) -> Result<()> {
        Self::adjust_for_value_change_batch(store, goal_id, old_value, new_value, 1)
    }

    /// Re-bases a batch of paid contributions in one adjustment.
    pub fn adjust_for_value_change_batch(
        store: &dyn Storage,
        goal_id: Uuid,
        old_value: Decimal,
        new_value: Decimal,
        affected_paid_count: usize,
    ) -> Result<()> {
        let delta = (new_value - old_value) * Decimal::from(affected_paid_count as u64);
        if delta.is_zero() {
            return Ok(());
        }
        store.add_to_goal_amount(goal_id, delta)
    }

    /// Executes one planned synchronization from a scoped mutation.
    pub fn apply(store: &dyn Storage, sync: &GoalSync) -> Result<()> {
        match sync {
            GoalSync::Credit {
                goal_id,
                value,
                count,
            } => Self::add_to_goal(store, *goal_id, *value, *count),
            GoalSync::Debit { goal_id, amount } => {
                Self::subtract_from_goal(store, *goal_id, *amount)
            }
            GoalSync::Rebase {
                goal_id,
                old_value,
                new_value,
                paid_count,
            } => Self::adjust_for_value_change_batch(
                store,
                *goal_id,
                *old_value,
                *new_value,
                *paid_count,
            ),
        }
    }

    pub fn create_goal(store: &dyn Storage, goal: SavingsGoal) -> Result<SavingsGoal> {
        store.insert_savings_goal(goal)
    }

    pub fn goals(store: &dyn Storage, owner: Uuid) -> Result<Vec<SavingsGoal>> {
        store.savings_goals(owner)
    }

    pub fn goal(store: &dyn Storage, owner: Uuid, id: Uuid) -> Result<SavingsGoal> {
        owned_goal(store, owner, id)
    }

    /// Updates a goal's name, target, or due date. The accumulated amount is
    /// synchronizer-owned and cannot be edited here.
    pub fn update_goal(
        store: &dyn Storage,
        owner: Uuid,
        id: Uuid,
        changes: GoalChanges,
    ) -> Result<SavingsGoal> {
        let mut goal = owned_goal(store, owner, id)?;
        if let Some(name) = changes.name {
            goal.name = name;
        }
        if let Some(target_amount) = changes.target_amount {
            goal.target_amount = target_amount;
        }
        if let Some(due_date) = changes.due_date {
            goal.due_date = Some(due_date);
        }
        store.update_savings_goal(goal.clone())?;
        Ok(goal)
    }

    pub fn delete_goal(store: &dyn Storage, owner: Uuid, id: Uuid) -> Result<()> {
        owned_goal(store, owner, id)?;
        store.delete_savings_goal(id)
    }

    /// Lists a goal's contributions, newest first, optionally restricted to
    /// one month.
    pub fn transactions_for_goal(
        store: &dyn Storage,
        owner: Uuid,
        goal_id: Uuid,
        query: &MonthQuery,
        today: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        owned_goal(store, owner, goal_id)?;
        let mut filter = TransactionFilter::owned_by(owner).with_goal(goal_id);
        if let Some(span) = query.span(today)? {
            filter = filter.with_span(span);
        }
        let mut rows = store.transactions(&filter)?;
        rows.reverse();
        Ok(rows)
    }
}
