//! Scoped transaction updates.
//!
//! A mutation against a series member fans out to the members selected by the
//! scope; the goal adjustments it implies are planned first, as pure data,
//! and executed as one synchronizer call each before the rows change.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::core::services::{
    owned_category, owned_transaction, series_snapshot, BalanceService, SavingsGoalService,
};
use crate::domain::{RecurrenceScope, RecurrenceUnit, Transaction};
use crate::errors::CoreError;
use crate::ledger::{month_of, months_touched, plan_goal_syncs, resolve_affected};
use crate::storage::{Result, Storage, TransactionPatch};

/// Field changes for a transaction update.
///
/// `recurrence_end_date` is double-optional so the cutoff can be explicitly
/// cleared; the other fields are replace-only. The auto-pay flag has its own
/// operation, [`UpdateService::update_is_auto`].
#[derive(Debug, Clone, Default)]
pub struct TransactionChanges {
    pub label: Option<String>,
    pub date: Option<NaiveDate>,
    pub value: Option<Decimal>,
    pub category_id: Option<Uuid>,
    pub recurrence: Option<RecurrenceUnit>,
    pub recurrence_end_date: Option<Option<NaiveDate>>,
    pub is_paid: Option<bool>,
}

impl TransactionChanges {
    pub fn value(value: Decimal) -> Self {
        Self {
            value: Some(value),
            ..Default::default()
        }
    }

    pub fn paid(is_paid: bool) -> Self {
        Self {
            is_paid: Some(is_paid),
            ..Default::default()
        }
    }

    /// The batch-propagated portion of the changes. The date never fans out:
    /// each series member keeps its own occurrence date.
    fn patch(&self) -> TransactionPatch {
        TransactionPatch {
            label: self.label.clone(),
            value: self.value,
            category_id: self.category_id,
            recurrence: self.recurrence,
            recurrence_end_date: self.recurrence_end_date,
            is_paid: self.is_paid,
            is_auto: None,
        }
    }
}

/// Applies scoped field updates and the auto-pay toggle.
pub struct UpdateService;

impl UpdateService {
    /// Updates a transaction under the given scope and returns the target's
    /// new state.
    ///
    /// Non-recurring, non-child targets ignore the scope and are updated
    /// alone. A date change applies to the target only and additionally
    /// invalidates the month it moved into.
    pub fn update_transaction(
        store: &dyn Storage,
        owner: Uuid,
        id: Uuid,
        changes: TransactionChanges,
        scope: RecurrenceScope,
    ) -> Result<Transaction> {
        let existing = owned_transaction(store, owner, id)?;
        if let Some(category_id) = changes.category_id {
            owned_category(store, owner, category_id)?;
        }

        let (affected_ids, mut months, syncs) = match series_snapshot(store, &existing)? {
            Some(series) => {
                let affected = resolve_affected(&series, &existing, scope);
                let syncs = plan_goal_syncs(&affected, &existing, changes.is_paid, changes.value);
                let ids: Vec<Uuid> = affected.iter().map(|txn| txn.id).collect();
                let months = months_touched(affected.iter().map(|txn| txn.date));
                (ids, months, syncs)
            }
            None => {
                let affected = [&existing];
                let syncs = plan_goal_syncs(&affected, &existing, changes.is_paid, changes.value);
                (vec![existing.id], months_touched([existing.date]), syncs)
            }
        };

        for sync in &syncs {
            SavingsGoalService::apply(store, sync)?;
        }
        let patch = changes.patch();
        if !patch.is_empty() {
            store.update_transactions(&affected_ids, &patch)?;
            debug!(transaction = %id, rows = affected_ids.len(), %scope, "Applied scoped update.");
        }
        if let Some(date) = changes.date {
            store.set_transaction_date(id, date)?;
            months.insert(month_of(date));
        }
        BalanceService::invalidate_months(store, owner, months)?;

        store
            .transaction(id)?
            .ok_or(CoreError::TransactionNotFound(id))
    }

    /// Toggles auto-pay on a recurring transaction, forcing the paid flag to
    /// match across the whole series when the target is its head.
    ///
    /// The forced paid flips route through the same goal-sync planning as a
    /// direct paid update, so a savings goal's accumulated amount stays
    /// consistent.
    pub fn update_is_auto(
        store: &dyn Storage,
        owner: Uuid,
        id: Uuid,
        is_auto: bool,
    ) -> Result<Transaction> {
        let existing = owned_transaction(store, owner, id)?;
        if existing.recurrence.is_none() {
            return Err(CoreError::InvalidArgument(
                "auto-pay can only be set on recurring transactions".into(),
            ));
        }
        let is_paid = is_auto;

        let (affected_ids, syncs) = if existing.is_series_head() {
            let series = series_snapshot(store, &existing)?
                .ok_or(CoreError::TransactionNotFound(id))?;
            let affected = resolve_affected(&series, &existing, RecurrenceScope::All);
            let syncs = plan_goal_syncs(&affected, &existing, Some(is_paid), None);
            let ids: Vec<Uuid> = affected.iter().map(|txn| txn.id).collect();
            (ids, syncs)
        } else {
            let affected = [&existing];
            let syncs = plan_goal_syncs(&affected, &existing, Some(is_paid), None);
            (vec![existing.id], syncs)
        };

        for sync in &syncs {
            SavingsGoalService::apply(store, sync)?;
        }
        let patch = TransactionPatch {
            is_auto: Some(is_auto),
            is_paid: Some(is_paid),
            ..Default::default()
        };
        store.update_transactions(&affected_ids, &patch)?;

        store
            .transaction(id)?
            .ok_or(CoreError::TransactionNotFound(id))
    }
}
