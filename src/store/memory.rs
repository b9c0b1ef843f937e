//! In-process entry store with the same observable semantics as the PostgreSQL store:
//! sequential ids, NULLs sorted last ascending and first descending, id as tie-break.

use crate::error::AppError;
use crate::model::{Entry, EntryColumn, EntryDraft, EntryId};
use crate::query::{EntryOrder, SortDirection, Window};
use crate::store::{EntryFilter, EntryStore};
use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Table {
    last_id: EntryId,
    rows: BTreeMap<EntryId, Entry>,
}

#[derive(Default)]
pub struct MemoryEntryStore {
    table: RwLock<Table>,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn keep(filter: &EntryFilter, entry: &Entry) -> bool {
    match &filter.search {
        Some(terms) => terms.matches(&entry.name),
        None => true,
    }
}

/// Ascending comparison on one column with NULLs greater than any value.
fn compare_column(column: EntryColumn, a: &Entry, b: &Entry) -> Ordering {
    match column {
        EntryColumn::Id => a.id.cmp(&b.id),
        EntryColumn::Name => a.name.cmp(&b.name),
        EntryColumn::Description => match (&a.description, &b.description) {
            (Some(x), Some(y)) => x.cmp(y),
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
        },
        EntryColumn::Date => a.date.cmp(&b.date),
        EntryColumn::Value => a.value.cmp(&b.value),
        EntryColumn::CreatedAt => a.created_at.cmp(&b.created_at),
        EntryColumn::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

fn compare(order: EntryOrder, a: &Entry, b: &Entry) -> Ordering {
    let primary = match order.direction {
        SortDirection::Asc => compare_column(order.column, a, b),
        SortDirection::Desc => compare_column(order.column, a, b).reverse(),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl EntryStore for MemoryEntryStore {
    async fn insert(&self, draft: &EntryDraft) -> Result<Entry, AppError> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let now = Utc::now();
        let entry = Entry {
            id: table.last_id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            date: draft.date,
            value: draft.value,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn find(&self, id: EntryId) -> Result<Option<Entry>, AppError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn update(&self, id: EntryId, draft: &EntryDraft) -> Result<Option<Entry>, AppError> {
        let mut table = self.table.write().await;
        let Some(entry) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        entry.name = draft.name.clone();
        entry.description = draft.description.clone();
        entry.date = draft.date;
        entry.value = draft.value;
        entry.updated_at = Utc::now();
        Ok(Some(entry.clone()))
    }

    async fn delete(&self, id: EntryId) -> Result<bool, AppError> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }

    async fn count(&self, filter: &EntryFilter) -> Result<u64, AppError> {
        let table = self.table.read().await;
        Ok(table.rows.values().filter(|e| keep(filter, e)).count() as u64)
    }

    async fn fetch(
        &self,
        filter: &EntryFilter,
        order: EntryOrder,
        window: Option<Window>,
    ) -> Result<Vec<Entry>, AppError> {
        let table = self.table.read().await;
        let mut rows: Vec<&Entry> = table.rows.values().filter(|e| keep(filter, e)).collect();
        rows.sort_by(|a, b| compare(order, a, b));
        let rows = rows.into_iter().cloned();
        Ok(match window {
            Some(w) => rows
                .skip(usize::try_from(w.offset).unwrap_or(usize::MAX))
                .take(w.limit as usize)
                .collect(),
            None => rows.collect(),
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
