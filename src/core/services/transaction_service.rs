//! Transaction creation: one constructor per entry kind, with bounded series
//! materialization, goal crediting, and cache invalidation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::core::services::{owned_category, owned_goal, BalanceService, SavingsGoalService};
use crate::domain::{RecurrenceUnit, Transaction, TransactionKind};
use crate::ledger::{expand, months_touched, DEFAULT_SERIES_CAP};
use crate::storage::{Result, Storage};

/// Fields for a new income, bill, or subscription entry.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub label: String,
    pub date: NaiveDate,
    pub value: Decimal,
    pub recurrence: Option<RecurrenceUnit>,
    pub recurrence_count: Option<u32>,
    pub recurrence_end_date: Option<NaiveDate>,
    pub is_paid: Option<bool>,
    pub is_auto: Option<bool>,
}

impl NewEntry {
    pub fn once(label: impl Into<String>, date: NaiveDate, value: Decimal) -> Self {
        Self {
            label: label.into(),
            date,
            value,
            recurrence: None,
            recurrence_count: None,
            recurrence_end_date: None,
            is_paid: None,
            is_auto: None,
        }
    }

    pub fn recurring(mut self, unit: RecurrenceUnit) -> Self {
        self.recurrence = Some(unit);
        self
    }
}

/// Fields for a new savings contribution; the label is derived from the goal.
#[derive(Debug, Clone)]
pub struct NewSaving {
    pub goal_id: Uuid,
    pub date: NaiveDate,
    pub value: Decimal,
    pub recurrence: Option<RecurrenceUnit>,
    pub recurrence_count: Option<u32>,
    pub recurrence_end_date: Option<NaiveDate>,
    pub is_paid: Option<bool>,
    pub is_auto: Option<bool>,
}

impl NewSaving {
    pub fn once(goal_id: Uuid, date: NaiveDate, value: Decimal) -> Self {
        Self {
            goal_id,
            date,
            value,
            recurrence: None,
            recurrence_count: None,
            recurrence_end_date: None,
            is_paid: None,
            is_auto: None,
        }
    }

    pub fn recurring(mut self, unit: RecurrenceUnit) -> Self {
        self.recurrence = Some(unit);
        self
    }
}

/// Fields for a new expense; the category reference is optional.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub label: String,
    pub date: NaiveDate,
    pub value: Decimal,
    pub category_id: Option<Uuid>,
    pub recurrence: Option<RecurrenceUnit>,
    pub recurrence_count: Option<u32>,
    pub recurrence_end_date: Option<NaiveDate>,
    pub is_paid: Option<bool>,
    pub is_auto: Option<bool>,
}

impl NewExpense {
    pub fn once(label: impl Into<String>, date: NaiveDate, value: Decimal) -> Self {
        Self {
            label: label.into(),
            date,
            value,
            category_id: None,
            recurrence: None,
            recurrence_count: None,
            recurrence_end_date: None,
            is_paid: None,
            is_auto: None,
        }
    }
}

/// Fields for a new refund. Refunds are single events: they carry no
/// recurrence and no auto-pay flag, and the category is required.
#[derive(Debug, Clone)]
pub struct NewRefund {
    pub label: String,
    pub date: NaiveDate,
    pub value: Decimal,
    pub category_id: Uuid,
    pub is_paid: Option<bool>,
}

/// Creates ledger entries of every kind.
pub struct TransactionService;

impl TransactionService {
    pub fn create_income(
        store: &dyn Storage,
        owner: Uuid,
        entry: NewEntry,
    ) -> Result<Transaction> {
        Self::create_entry(store, owner, entry, TransactionKind::Income)
    }

    pub fn create_bill(store: &dyn Storage, owner: Uuid, entry: NewEntry) -> Result<Transaction> {
        Self::create_entry(store, owner, entry, TransactionKind::Bill)
    }

    pub fn create_subscription(
        store: &dyn Storage,
        owner: Uuid,
        entry: NewEntry,
    ) -> Result<Transaction> {
        Self::create_entry(store, owner, entry, TransactionKind::Subscription)
    }

    /// Creates a savings contribution against an owned goal and credits the
    /// goal for every paid occurrence in a single adjustment.
    pub fn create_saving(
        store: &dyn Storage,
        owner: Uuid,
        saving: NewSaving,
    ) -> Result<Transaction> {
        let goal = owned_goal(store, owner, saving.goal_id)?;
        let is_paid = resolve_is_paid(saving.is_paid, saving.is_auto, false);
        let head = Transaction::new(
            owner,
            format!("Saving to {}", goal.name),
            saving.date,
            saving.value,
            TransactionKind::Savings,
        )
        .with_goal(saving.goal_id)
        .with_recurrence(
            saving.recurrence,
            saving.recurrence_count,
            saving.recurrence_end_date,
        )
        .with_payment(is_paid, saving.is_auto);
        let (head, children) = Self::persist_with_series(store, head)?;
        if is_paid {
            SavingsGoalService::add_to_goal(store, saving.goal_id, head.value, 1 + children.len())?;
        }
        Self::invalidate_touched_months(store, owner, &head, &children)?;
        Ok(head)
    }

    /// Creates an expense. Expenses default to paid: an expense is normally
    /// recorded after the money has already left.
    pub fn create_expense(
        store: &dyn Storage,
        owner: Uuid,
        expense: NewExpense,
    ) -> Result<Transaction> {
        if let Some(category_id) = expense.category_id {
            owned_category(store, owner, category_id)?;
        }
        let is_paid = resolve_is_paid(expense.is_paid, expense.is_auto, true);
        let head = Transaction::new(
            owner,
            expense.label,
            expense.date,
            expense.value,
            TransactionKind::Expense,
        )
        .with_category(expense.category_id)
        .with_recurrence(
            expense.recurrence,
            expense.recurrence_count,
            expense.recurrence_end_date,
        )
        .with_payment(is_paid, expense.is_auto);
        let (head, children) = Self::persist_with_series(store, head)?;
        Self::invalidate_touched_months(store, owner, &head, &children)?;
        Ok(head)
    }

    pub fn create_refund(
        store: &dyn Storage,
        owner: Uuid,
        refund: NewRefund,
    ) -> Result<Transaction> {
        owned_category(store, owner, refund.category_id)?;
        let head = Transaction::new(
            owner,
            refund.label,
            refund.date,
            refund.value,
            TransactionKind::Refund,
        )
        .with_category(Some(refund.category_id))
        .with_payment(refund.is_paid.unwrap_or(true), None);
        let head = store.insert_transaction(head)?;
        Self::invalidate_touched_months(store, owner, &head, &[])?;
        Ok(head)
    }

    fn create_entry(
        store: &dyn Storage,
        owner: Uuid,
        entry: NewEntry,
        kind: TransactionKind,
    ) -> Result<Transaction> {
        let is_paid = resolve_is_paid(entry.is_paid, entry.is_auto, false);
        let head = Transaction::new(owner, entry.label, entry.date, entry.value, kind)
            .with_recurrence(
                entry.recurrence,
                entry.recurrence_count,
                entry.recurrence_end_date,
            )
            .with_payment(is_paid, entry.is_auto);
        let (head, children) = Self::persist_with_series(store, head)?;
        Self::invalidate_touched_months(store, owner, &head, &children)?;
        Ok(head)
    }

    /// Persists the head and, when it defines a recurrence, materializes its
    /// bounded series of future occurrences as one batch insert.
    ///
    /// An explicit occurrence total includes the head, so the expansion cap is
    /// `recurrence_count - 1`; the end date clips the expansion either way.
    fn persist_with_series(
        store: &dyn Storage,
        head: Transaction,
    ) -> Result<(Transaction, Vec<Transaction>)> {
        let head = store.insert_transaction(head)?;
        let Some(unit) = head.recurrence else {
            return Ok((head, Vec::new()));
        };
        let cap = head
            .recurrence_count
            .map(|count| count.saturating_sub(1))
            .unwrap_or(DEFAULT_SERIES_CAP);
        let dates = expand(head.date, unit, head.recurrence_end_date, cap);
        let children: Vec<Transaction> = dates
            .into_iter()
            .map(|date| head.child_occurrence(date))
            .collect();
        if !children.is_empty() {
            store.insert_transactions(children.clone())?;
            debug!(head = %head.id, occurrences = children.len(), "Materialized series.");
        }
        Ok((head, children))
    }

    fn invalidate_touched_months(
        store: &dyn Storage,
        owner: Uuid,
        head: &Transaction,
        children: &[Transaction],
    ) -> Result<()> {
        let months = months_touched(
            std::iter::once(head.date).chain(children.iter().map(|child| child.date)),
        );
        BalanceService::invalidate_months(store, owner, months)
    }
}

/// A caller-supplied flag wins; otherwise auto-pay entries start paid and
/// everything else falls back to the kind's default.
fn resolve_is_paid(is_paid: Option<bool>, is_auto: Option<bool>, default_paid: bool) -> bool {
    match is_paid {
        Some(flag) => flag,
        None => default_paid || is_auto.unwrap_or(false),
    }
}
