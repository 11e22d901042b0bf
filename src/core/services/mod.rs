//! Stateless service structs implementing the engine's operations.

pub mod balance_service;
pub mod category_service;
pub mod deletion_service;
pub mod horizon_service;
pub mod query_service;
pub mod savings_goal_service;
pub mod transaction_service;
pub mod update_service;

pub use balance_service::BalanceService;
pub use category_service::CategoryService;
pub use deletion_service::DeletionService;
pub use horizon_service::{HorizonService, SweepSummary, HORIZON_MONTHS};
pub use query_service::{MonthQuery, QueryService};
pub use savings_goal_service::SavingsGoalService;
pub use transaction_service::{NewEntry, NewExpense, NewRefund, NewSaving, TransactionService};
pub use update_service::{TransactionChanges, UpdateService};

use uuid::Uuid;

use crate::domain::{Category, SavingsGoal, Transaction};
use crate::errors::CoreError;
use crate::ledger::SeriesSnapshot;
use crate::storage::{Result, Storage, TransactionFilter};

pub(crate) fn owned_transaction(store: &dyn Storage, owner: Uuid, id: Uuid) -> Result<Transaction> {
    let txn = store
        .transaction(id)?
        .ok_or(CoreError::TransactionNotFound(id))?;
    if txn.owner != owner {
        return Err(CoreError::Forbidden(
            "You do not have access to this transaction".into(),
        ));
    }
    Ok(txn)
}

pub(crate) fn owned_category(store: &dyn Storage, owner: Uuid, id: Uuid) -> Result<Category> {
    let category = store.category(id)?.ok_or(CoreError::CategoryNotFound(id))?;
    if category.owner != owner {
        return Err(CoreError::Forbidden(
            "You do not have access to this category".into(),
        ));
    }
    Ok(category)
}

pub(crate) fn owned_goal(store: &dyn Storage, owner: Uuid, id: Uuid) -> Result<SavingsGoal> {
    let goal = store.savings_goal(id)?.ok_or(CoreError::GoalNotFound(id))?;
    if goal.owner != owner {
        return Err(CoreError::Forbidden(
            "You do not have access to this savings goal".into(),
        ));
    }
    Ok(goal)
}

/// Fetches the full series a transaction belongs to, or `None` when the
/// target is neither a series head nor a generated child.
pub(crate) fn series_snapshot(
    store: &dyn Storage,
    target: &Transaction,
) -> Result<Option<SeriesSnapshot>> {
    let head_id = if target.is_series_head() {
        target.id
    } else if let Some(parent_id) = target.parent_id {
        parent_id
    } else {
        return Ok(None);
    };
    let head = if head_id == target.id {
        target.clone()
    } else {
        store
            .transaction(head_id)?
            .ok_or(CoreError::TransactionNotFound(head_id))?
    };
    let children =
        store.transactions(&TransactionFilter::owned_by(head.owner).with_parent(head.id))?;
    Ok(Some(SeriesSnapshot { head, children }))
}
