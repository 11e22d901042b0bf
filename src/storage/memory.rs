//! In-memory storage backend with optional JSON snapshot persistence.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Category, MonthlyBalanceSnapshot, SavingsGoal, Transaction};
use crate::errors::CoreError;

use super::{Result, Storage, TransactionFilter, TransactionPatch};

const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Collections {
    transactions: HashMap<Uuid, Transaction>,
    categories: HashMap<Uuid, Category>,
    goals: HashMap<Uuid, SavingsGoal>,
    snapshots: HashMap<String, MonthlyBalanceSnapshot>,
    #[serde(skip)]
    goal_increment_ops: usize,
}

/// Mutex-guarded collections implementing [`Storage`].
///
/// Goal increments are applied while holding the store lock, which is this
/// backend's atomic-update primitive. The whole store can be snapshotted to a
/// JSON file and loaded back.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the collections to `path` as pretty JSON, via a temp file and
    /// rename so a crash never leaves a half-written snapshot behind.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(&*self.lock())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = tmp_path(path);
        fs::write(&tmp, data)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Loads a store previously written by [`MemoryStore::save_to_path`].
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let collections: Collections = serde_json::from_str(&data)?;
        Ok(Self {
            inner: Mutex::new(collections),
        })
    }

    /// Number of atomic goal increments applied since construction. Lets
    /// tests assert that scoped mutations synchronize in batches rather than
    /// per row.
    pub fn goal_increment_ops(&self) -> usize {
        self.lock().goal_increment_ops
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Storage for MemoryStore {
    fn insert_transaction(&self, txn: Transaction) -> Result<Transaction> {
        self.lock().transactions.insert(txn.id, txn.clone());
        Ok(txn)
    }

    fn insert_transactions(&self, txns: Vec<Transaction>) -> Result<usize> {
        let mut inner = self.lock();
        let count = txns.len();
        for txn in txns {
            inner.transactions.insert(txn.id, txn);
        }
        Ok(count)
    }

    fn transaction(&self, id: Uuid) -> Result<Option<Transaction>> {
        Ok(self.lock().transactions.get(&id).cloned())
    }

    fn transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let inner = self.lock();
        let mut rows: Vec<Transaction> = inner
            .transactions
            .values()
            .filter(|txn| filter.matches(txn))
            .cloned()
            .collect();
        rows.sort_by_key(|txn| (txn.date, txn.created_at, txn.id));
        Ok(rows)
    }

    fn update_transactions(&self, ids: &[Uuid], patch: &TransactionPatch) -> Result<usize> {
        let mut inner = self.lock();
        let mut updated = 0;
        for id in ids {
            if let Some(txn) = inner.transactions.get_mut(id) {
                patch.apply(txn);
                txn.updated_at = Utc::now();
                updated += 1;
            }
        }
        Ok(updated)
    }

    fn set_transaction_date(&self, id: Uuid, date: NaiveDate) -> Result<()> {
        let mut inner = self.lock();
        let txn = inner
            .transactions
            .get_mut(&id)
            .ok_or(CoreError::TransactionNotFound(id))?;
        txn.date = date;
        txn.updated_at = Utc::now();
        Ok(())
    }

    fn delete_transactions(&self, ids: &[Uuid]) -> Result<usize> {
        let mut inner = self.lock();
        let mut deleted = 0;
        for id in ids {
            if inner.transactions.remove(id).is_some() {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    fn insert_category(&self, category: Category) -> Result<Category> {
        self.lock().categories.insert(category.id, category.clone());
        Ok(category)
    }

    fn category(&self, id: Uuid) -> Result<Option<Category>> {
        Ok(self.lock().categories.get(&id).cloned())
    }

    fn categories(&self, owner: Uuid) -> Result<Vec<Category>> {
        let inner = self.lock();
        let mut rows: Vec<Category> = inner
            .categories
            .values()
            .filter(|category| category.owner == owner)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.label.cmp(&b.label).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    fn update_category(&self, category: Category) -> Result<()> {
        let mut inner = self.lock();
        let id = category.id;
        match inner.categories.get_mut(&id) {
            Some(existing) => {
                *existing = category;
                Ok(())
            }
            None => Err(CoreError::CategoryNotFound(id)),
        }
    }

    fn delete_category(&self, id: Uuid) -> Result<()> {
        self.lock().categories.remove(&id);
        Ok(())
    }

    fn insert_savings_goal(&self, goal: SavingsGoal) -> Result<SavingsGoal> {
        self.lock().goals.insert(goal.id, goal.clone());
        Ok(goal)
    }

    fn savings_goal(&self, id: Uuid) -> Result<Option<SavingsGoal>> {
        Ok(self.lock().goals.get(&id).cloned())
    }

    fn savings_goals(&self, owner: Uuid) -> Result<Vec<SavingsGoal>> {
        let inner = self.lock();
        let mut rows: Vec<SavingsGoal> = inner
            .goals
            .values()
            .filter(|goal| goal.owner == owner)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    fn update_savings_goal(&self, goal: SavingsGoal) -> Result<()> {
        let mut inner = self.lock();
        let existing = inner
            .goals
            .get_mut(&goal.id)
            .ok_or(CoreError::GoalNotFound(goal.id))?;
        existing.name = goal.name;
        existing.target_amount = goal.target_amount;
        existing.due_date = goal.due_date;
        Ok(())
    }

    fn delete_savings_goal(&self, id: Uuid) -> Result<()> {
        self.lock().goals.remove(&id);
        Ok(())
    }

    fn add_to_goal_amount(&self, id: Uuid, delta: Decimal) -> Result<()> {
        let mut inner = self.lock();
        let goal = inner.goals.get_mut(&id).ok_or(CoreError::GoalNotFound(id))?;
        goal.current_amount += delta;
        inner.goal_increment_ops += 1;
        Ok(())
    }

    fn balance_snapshot(
        &self,
        owner: Uuid,
        year: i32,
        month: u32,
    ) -> Result<Option<MonthlyBalanceSnapshot>> {
        Ok(self
            .lock()
            .snapshots
            .get(&snapshot_key(owner, year, month))
            .cloned())
    }

    fn upsert_balance_snapshot(&self, snapshot: MonthlyBalanceSnapshot) -> Result<()> {
        let key = snapshot_key(snapshot.owner, snapshot.year, snapshot.month);
        self.lock().snapshots.insert(key, snapshot);
        Ok(())
    }
}

fn snapshot_key(owner: Uuid, year: i32, month: u32) -> String {
    format!("{owner}:{year:04}-{month:02}")
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}
