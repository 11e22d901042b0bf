//! Storage collaborator abstraction over the four entity collections.

pub mod memory;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    Category, DateSpan, MonthlyBalanceSnapshot, RecurrenceUnit, SavingsGoal, Transaction,
    TransactionKind,
};
use crate::errors::CoreError;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Filter over the transaction collection. Unset fields match everything;
/// `kinds` is an OR over the listed kinds, `date_span` is inclusive on both
/// ends, and `heads_only` restricts to series heads (recurrence set, no
/// parent).
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub owner: Option<Uuid>,
    pub kinds: Vec<TransactionKind>,
    pub category_id: Option<Uuid>,
    pub goal_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub date_span: Option<DateSpan>,
    pub heads_only: bool,
}

impl TransactionFilter {
    pub fn owned_by(owner: Uuid) -> Self {
        Self {
            owner: Some(owner),
            ..Default::default()
        }
    }

    pub fn with_kinds(mut self, kinds: &[TransactionKind]) -> Self {
        self.kinds = kinds.to_vec();
        self
    }

    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_goal(mut self, goal_id: Uuid) -> Self {
        self.goal_id = Some(goal_id);
        self
    }

    pub fn with_parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_span(mut self, span: DateSpan) -> Self {
        self.date_span = Some(span);
        self
    }

    pub fn heads_only(mut self) -> Self {
        self.heads_only = true;
        self
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        if self.owner.is_some_and(|owner| txn.owner != owner) {
            return false;
        }
        if !self.kinds.is_empty() && !self.kinds.contains(&txn.kind) {
            return false;
        }
        if self.category_id.is_some() && txn.category_id != self.category_id {
            return false;
        }
        if self.goal_id.is_some() && txn.goal_id != self.goal_id {
            return false;
        }
        if self.parent_id.is_some() && txn.parent_id != self.parent_id {
            return false;
        }
        if self.date_span.is_some_and(|span| !span.contains(txn.date)) {
            return false;
        }
        if self.heads_only && !txn.is_series_head() {
            return false;
        }
        true
    }
}

/// Field changes applied to a batch of transactions in one operation.
///
/// `date` is deliberately absent: scoped fan-out never moves occurrence
/// dates; a date change goes through [`Storage::set_transaction_date`] on the
/// single target. `recurrence_end_date` is double-optional so the cutoff can
/// be explicitly cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub label: Option<String>,
    pub value: Option<Decimal>,
    pub category_id: Option<Uuid>,
    pub recurrence: Option<RecurrenceUnit>,
    pub recurrence_end_date: Option<Option<NaiveDate>>,
    pub is_paid: Option<bool>,
    pub is_auto: Option<bool>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply(&self, txn: &mut Transaction) {
        if let Some(label) = &self.label {
            txn.label = label.clone();
        }
        if let Some(value) = self.value {
            txn.value = value;
        }
        if let Some(category_id) = self.category_id {
            txn.category_id = Some(category_id);
        }
        if let Some(recurrence) = self.recurrence {
            txn.recurrence = Some(recurrence);
        }
        if let Some(end_date) = self.recurrence_end_date {
            txn.recurrence_end_date = end_date;
        }
        if let Some(is_paid) = self.is_paid {
            txn.is_paid = Some(is_paid);
        }
        if let Some(is_auto) = self.is_auto {
            txn.is_auto = Some(is_auto);
        }
    }
}

/// Abstraction over persistence backends holding the engine's collections.
///
/// Multi-row operations are batches by contract, and
/// [`Storage::add_to_goal_amount`] is the backend's atomic increment: the
/// engine never reads a goal amount and writes back a computed absolute
/// value.
pub trait Storage: Send + Sync {
    fn insert_transaction(&self, txn: Transaction) -> Result<Transaction>;
    fn insert_transactions(&self, txns: Vec<Transaction>) -> Result<usize>;
    fn transaction(&self, id: Uuid) -> Result<Option<Transaction>>;
    /// Matching transactions in ascending date order.
    fn transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>>;
    /// Applies the patch to every listed row that exists; returns the count.
    fn update_transactions(&self, ids: &[Uuid], patch: &TransactionPatch) -> Result<usize>;
    fn set_transaction_date(&self, id: Uuid, date: NaiveDate) -> Result<()>;
    fn delete_transactions(&self, ids: &[Uuid]) -> Result<usize>;

    fn insert_category(&self, category: Category) -> Result<Category>;
    fn category(&self, id: Uuid) -> Result<Option<Category>>;
    fn categories(&self, owner: Uuid) -> Result<Vec<Category>>;
    fn update_category(&self, category: Category) -> Result<()>;
    fn delete_category(&self, id: Uuid) -> Result<()>;

    fn insert_savings_goal(&self, goal: SavingsGoal) -> Result<SavingsGoal>;
    fn savings_goal(&self, id: Uuid) -> Result<Option<SavingsGoal>>;
    fn savings_goals(&self, owner: Uuid) -> Result<Vec<SavingsGoal>>;
    /// Replaces name, target and due date; `current_amount` is owned by
    /// [`Storage::add_to_goal_amount`] and never written here.
    fn update_savings_goal(&self, goal: SavingsGoal) -> Result<()>;
    fn delete_savings_goal(&self, id: Uuid) -> Result<()>;
    /// Atomically increments the goal's accumulated amount.
    fn add_to_goal_amount(&self, id: Uuid, delta: Decimal) -> Result<()>;

    fn balance_snapshot(
        &self,
        owner: Uuid,
        year: i32,
        month: u32,
    ) -> Result<Option<MonthlyBalanceSnapshot>>;
    /// Replaces the (owner, year, month) row wholesale.
    fn upsert_balance_snapshot(&self, snapshot: MonthlyBalanceSnapshot) -> Result<()>;
}
