//! Domain models for ledger entries and their recurrence metadata.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::Identifiable;

/// A single ledger entry, either standalone or a member of a recurring series.
///
/// A series head carries the recurrence rule and a `parent_id` of `None`;
/// every generated occurrence references the head through `parent_id` and
/// copies the rule for reference, never changing it independently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub owner: Uuid,
    pub label: String,
    pub date: NaiveDate,
    pub value: Decimal,
    pub kind: TransactionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_paid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_auto: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        owner: Uuid,
        label: impl Into<String>,
        date: NaiveDate,
        value: Decimal,
        kind: TransactionKind,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner,
            label: label.into(),
            date,
            value,
            kind,
            category_id: None,
            goal_id: None,
            recurrence: None,
            recurrence_count: None,
            recurrence_end_date: None,
            parent_id: None,
            is_paid: None,
            is_auto: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_category(mut self, category_id: Option<Uuid>) -> Self {
        self.category_id = category_id;
        self
    }

    pub fn with_goal(mut self, goal_id: Uuid) -> Self {
        self.goal_id = Some(goal_id);
        self
    }

    pub fn with_recurrence(
        mut self,
        unit: Option<RecurrenceUnit>,
        count: Option<u32>,
        end_date: Option<NaiveDate>,
    ) -> Self {
        self.recurrence = unit;
        self.recurrence_count = count;
        self.recurrence_end_date = end_date;
        self
    }

    pub fn with_payment(mut self, is_paid: bool, is_auto: Option<bool>) -> Self {
        self.is_paid = Some(is_paid);
        self.is_auto = is_auto;
        self
    }

    /// True when this entry defines a recurring series.
    pub fn is_series_head(&self) -> bool {
        self.recurrence.is_some() && self.parent_id.is_none()
    }

    /// True when this entry was generated from a series head.
    pub fn is_series_child(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Whether the entry counts as settled; an absent flag means unpaid.
    pub fn is_settled(&self) -> bool {
        self.is_paid.unwrap_or(false)
    }

    /// Builds a generated occurrence of this head for the given date.
    ///
    /// Children copy label, value, kind, references, the recurrence rule and
    /// its end date, and the payment flags. The occurrence total stays on the
    /// head only.
    pub fn child_occurrence(&self, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner: self.owner,
            label: self.label.clone(),
            date,
            value: self.value,
            kind: self.kind,
            category_id: self.category_id,
            goal_id: self.goal_id,
            recurrence: self.recurrence,
            recurrence_count: None,
            recurrence_end_date: self.recurrence_end_date,
            parent_id: Some(self.id),
            is_paid: self.is_paid,
            is_auto: self.is_auto,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
/// Enumerates the ledger entry kinds.
pub enum TransactionKind {
    Income,
    Bill,
    Subscription,
    Savings,
    Expense,
    Refund,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Income => "Income",
            TransactionKind::Bill => "Bill",
            TransactionKind::Subscription => "Subscription",
            TransactionKind::Savings => "Savings",
            TransactionKind::Expense => "Expense",
            TransactionKind::Refund => "Refund",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// Cadence of a recurring series.
pub enum RecurrenceUnit {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl fmt::Display for RecurrenceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecurrenceUnit::Daily => "Daily",
            RecurrenceUnit::Weekly => "Weekly",
            RecurrenceUnit::Monthly => "Monthly",
            RecurrenceUnit::Yearly => "Yearly",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
/// Breadth of a series that a mutation applies to.
pub enum RecurrenceScope {
    #[default]
    CurrentOnly,
    CurrentAndFuture,
    All,
}

impl fmt::Display for RecurrenceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecurrenceScope::CurrentOnly => "Current Only",
            RecurrenceScope::CurrentAndFuture => "Current and Future",
            RecurrenceScope::All => "All",
        };
        f.write_str(label)
    }
}
