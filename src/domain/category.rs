//! Domain types for user-owned spending categories.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::Identifiable;

/// A spending category. Referenced, never owned, by transactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub owner: Uuid,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(owner: Uuid, label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            label: label.into(),
            icon: None,
            color: None,
            budget: None,
            created_at: Utc::now(),
        }
    }
}

impl Identifiable for Category {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Caller-editable category fields. Unset fields stay unchanged.
#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub label: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub budget: Option<Decimal>,
}
