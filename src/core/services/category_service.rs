//! Category CRUD and category-scoped transaction listings.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::services::{owned_category, MonthQuery};
use crate::domain::{Category, CategoryChanges, Transaction};
use crate::storage::{Result, Storage, TransactionFilter};

/// Manages a user's spending categories.
pub struct CategoryService;

impl CategoryService {
    pub fn create(store: &dyn Storage, category: Category) -> Result<Category> {
        store.insert_category(category)
    }

    pub fn categories(store: &dyn Storage, owner: Uuid) -> Result<Vec<Category>> {
        store.categories(owner)
    }

    pub fn category(store: &dyn Storage, owner: Uuid, id: Uuid) -> Result<Category> {
        owned_category(store, owner, id)
    }

    pub fn update(
        store: &dyn Storage,
        owner: Uuid,
        id: Uuid,
        changes: CategoryChanges,
    ) -> Result<Category> {
        let mut category = owned_category(store, owner, id)?;
        if let Some(label) = changes.label {
            category.label = label;
        }
        if let Some(icon) = changes.icon {
            category.icon = Some(icon);
        }
        if let Some(color) = changes.color {
            category.color = Some(color);
        }
        if let Some(budget) = changes.budget {
            category.budget = Some(budget);
        }
        store.update_category(category.clone())?;
        Ok(category)
    }

    pub fn delete(store: &dyn Storage, owner: Uuid, id: Uuid) -> Result<()> {
        owned_category(store, owner, id)?;
        store.delete_category(id)
    }

    /// Lists the category's transactions, newest first, optionally restricted
    /// to one month.
    pub fn transactions_for_category(
        store: &dyn Storage,
        owner: Uuid,
        category_id: Uuid,
        query: &MonthQuery,
        today: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        owned_category(store, owner, category_id)?;
        let mut filter = TransactionFilter::owned_by(owner).with_category(category_id);
        if let Some(span) = query.span(today)? {
            filter = filter.with_span(span);
        }
        let mut rows = store.transactions(&filter)?;
        rows.reverse();
        Ok(rows)
    }
}
