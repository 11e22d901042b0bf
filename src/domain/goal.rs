//! Domain types for savings goals.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::Identifiable;

/// A savings target accumulated by paid savings transactions.
///
/// `current_amount` is derived state: it equals the summed value of all paid
/// savings transactions referencing the goal, and is only ever moved through
/// the storage layer's atomic increment, never overwritten.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavingsGoal {
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl SavingsGoal {
    pub fn new(
        owner: Uuid,
        name: impl Into<String>,
        target_amount: Decimal,
        due_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            name: name.into(),
            target_amount,
            current_amount: Decimal::ZERO,
            due_date,
            created_at: Utc::now(),
        }
    }
}

impl Identifiable for SavingsGoal {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Caller-editable goal fields. Unset fields stay unchanged; the accumulated
/// amount is not here on purpose.
#[derive(Debug, Clone, Default)]
pub struct GoalChanges {
    pub name: Option<String>,
    pub target_amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
}
