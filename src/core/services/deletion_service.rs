//! Scoped transaction deletes.

use tracing::debug;
use uuid::Uuid;

use crate::core::services::{owned_transaction, series_snapshot, BalanceService, SavingsGoalService};
use crate::domain::{RecurrenceScope, Transaction};
use crate::ledger::{months_touched, plan_goal_refunds, resolve_affected};
use crate::storage::{Result, Storage};

/// Deletes transactions, refunding paid savings contributions to their goals.
pub struct DeletionService;

impl DeletionService {
    /// Deletes a transaction under the given scope.
    ///
    /// The affected rows are removed in one batch; paid savings rows among
    /// them are first debited from their goal, one summed adjustment per
    /// distinct goal. Every month the removed rows touched is invalidated.
    pub fn delete_transaction(
        store: &dyn Storage,
        owner: Uuid,
        id: Uuid,
        scope: RecurrenceScope,
    ) -> Result<()> {
        let existing = owned_transaction(store, owner, id)?;
        let affected: Vec<Transaction> = match series_snapshot(store, &existing)? {
            Some(series) => resolve_affected(&series, &existing, scope)
                .into_iter()
                .cloned()
                .collect(),
            None => vec![existing],
        };

        let rows: Vec<&Transaction> = affected.iter().collect();
        for refund in plan_goal_refunds(&rows) {
            SavingsGoalService::apply(store, &refund)?;
        }

        let ids: Vec<Uuid> = affected.iter().map(|txn| txn.id).collect();
        store.delete_transactions(&ids)?;
        debug!(transaction = %id, rows = ids.len(), %scope, "Deleted transactions.");

        let months = months_touched(affected.iter().map(|txn| txn.date));
        BalanceService::invalidate_months(store, owner, months)
    }
}
