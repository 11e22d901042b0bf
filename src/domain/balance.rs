//! Monthly aggregate types derived from the transaction ledger.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::transaction::{Transaction, TransactionKind};

/// Per-kind value totals for one calendar month.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KindTotals {
    pub income: Decimal,
    pub bills: Decimal,
    pub savings: Decimal,
    pub subscriptions: Decimal,
    pub expenses: Decimal,
    pub refunds: Decimal,
}

impl KindTotals {
    pub fn record(&mut self, kind: TransactionKind, value: Decimal) {
        match kind {
            TransactionKind::Income => self.income += value,
            TransactionKind::Bill => self.bills += value,
            TransactionKind::Savings => self.savings += value,
            TransactionKind::Subscription => self.subscriptions += value,
            TransactionKind::Expense => self.expenses += value,
            TransactionKind::Refund => self.refunds += value,
        }
    }

    pub fn aggregate<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let mut totals = Self::default();
        for txn in transactions {
            totals.record(txn.kind, txn.value);
        }
        totals
    }

    /// The month's own contribution: inflows minus planned and actual outflows.
    pub fn delta(&self) -> Decimal {
        (self.income + self.refunds)
            - (self.bills + self.savings + self.subscriptions + self.expenses)
    }
}

/// Cached aggregate row for one (owner, year, month).
///
/// Derived from the ledger and replaced wholesale on every write; the source
/// of truth is always the transaction collection for that month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthlyBalanceSnapshot {
    pub owner: Uuid,
    pub year: i32,
    pub month: u32,
    pub totals: KindTotals,
    pub balance: Decimal,
}

/// Read model returned to callers: a month's totals plus the previous month's
/// cached balance, when one exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthlyBalance {
    pub year: i32,
    pub month: u32,
    pub totals: KindTotals,
    pub balance: Decimal,
    pub previous_month_balance: Option<Decimal>,
}
