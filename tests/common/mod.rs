#![allow(dead_code)]

use chrono::NaiveDate;
use ledger_core::core::services::{NewEntry, NewSaving, TransactionService};
use ledger_core::domain::{Category, RecurrenceUnit, SavingsGoal, Transaction};
use ledger_core::storage::memory::MemoryStore;
use ledger_core::storage::{Storage, TransactionFilter};
use rust_decimal::Decimal;
use uuid::Uuid;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn money(amount: i64) -> Decimal {
    Decimal::from(amount)
}

/// A fresh store plus the owner id every fixture is scoped to.
pub fn store_with_owner() -> (MemoryStore, Uuid) {
    (MemoryStore::new(), Uuid::new_v4())
}

pub fn seeded_goal(store: &MemoryStore, owner: Uuid, target: i64) -> SavingsGoal {
    store
        .insert_savings_goal(SavingsGoal::new(owner, "Vacation", money(target), None))
        .unwrap()
}

pub fn seeded_category(store: &MemoryStore, owner: Uuid, label: &str) -> Category {
    store.insert_category(Category::new(owner, label)).unwrap()
}

/// Creates a paid monthly savings series totalling `occurrences` rows (head
/// included) and returns the head.
pub fn paid_savings_series(
    store: &MemoryStore,
    owner: Uuid,
    goal_id: Uuid,
    start: NaiveDate,
    value: i64,
    occurrences: u32,
) -> Transaction {
    let mut saving =
        NewSaving::once(goal_id, start, money(value)).recurring(RecurrenceUnit::Monthly);
    saving.recurrence_count = Some(occurrences);
    saving.is_paid = Some(true);
    TransactionService::create_saving(store, owner, saving).unwrap()
}

/// Creates a monthly bill series totalling `occurrences` rows (head included)
/// and returns the head.
pub fn bill_series(
    store: &MemoryStore,
    owner: Uuid,
    start: NaiveDate,
    value: i64,
    occurrences: u32,
) -> Transaction {
    let mut entry = NewEntry::once("Rent", start, money(value)).recurring(RecurrenceUnit::Monthly);
    entry.recurrence_count = Some(occurrences);
    TransactionService::create_bill(store, owner, entry).unwrap()
}

/// The series' children in ascending date order.
pub fn children_of(store: &MemoryStore, head: &Transaction) -> Vec<Transaction> {
    store
        .transactions(&TransactionFilter::owned_by(head.owner).with_parent(head.id))
        .unwrap()
}

/// Every transaction the owner has, ascending by date.
pub fn all_rows(store: &MemoryStore, owner: Uuid) -> Vec<Transaction> {
    store
        .transactions(&TransactionFilter::owned_by(owner))
        .unwrap()
}

pub fn goal_amount(store: &MemoryStore, goal_id: Uuid) -> Decimal {
    store.savings_goal(goal_id).unwrap().unwrap().current_amount
}

/// Inserts a ledger row directly through the storage collaborator, leaving
/// every cached month untouched. Useful for exercising genuinely cold reads.
pub fn raw_entry(
    store: &MemoryStore,
    owner: Uuid,
    label: &str,
    on: NaiveDate,
    value: i64,
    kind: ledger_core::domain::TransactionKind,
) -> Transaction {
    store
        .insert_transaction(Transaction::new(owner, label, on, money(value), kind))
        .unwrap()
}
