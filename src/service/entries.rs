//! Entry operations composed from store calls and validation.

use crate::error::AppError;
use crate::model::{Entry, EntryChanges, EntryDraft, EntryId};
use crate::query::{self, ListQuery, Listing};
use crate::service::EntryValidator;
use crate::store::EntryStore;

pub struct EntryService;

impl EntryService {
    /// Validate then insert. Returns the stored record with its id.
    pub async fn create(store: &dyn EntryStore, changes: &EntryChanges) -> Result<Entry, AppError> {
        let draft = EntryValidator::validate_new(changes)?;
        let entry = store.insert(&draft).await?;
        tracing::info!(id = entry.id, "entry created");
        Ok(entry)
    }

    pub async fn find(store: &dyn EntryStore, id: EntryId) -> Result<Entry, AppError> {
        store.find(id).await?.ok_or_else(|| not_found(id))
    }

    /// Look up, merge, validate the merged record, then write. An update that changes nothing
    /// returns the current record without touching storage.
    pub async fn update(
        store: &dyn EntryStore,
        id: EntryId,
        changes: &EntryChanges,
    ) -> Result<Entry, AppError> {
        let current = Self::find(store, id).await?;
        let draft = EntryValidator::validate_merged(&current, changes)?;
        if draft == EntryDraft::from(&current) {
            return Ok(current);
        }
        // Deleted between the lookup and the write.
        let entry = store.update(id, &draft).await?.ok_or_else(|| not_found(id))?;
        tracing::info!(id, "entry updated");
        Ok(entry)
    }

    pub async fn delete(store: &dyn EntryStore, id: EntryId) -> Result<(), AppError> {
        if !store.delete(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(id, "entry deleted");
        Ok(())
    }

    pub async fn list(store: &dyn EntryStore, query: &ListQuery) -> Result<Listing, AppError> {
        query::compose(store, query).await
    }
}

fn not_found(id: EntryId) -> AppError {
    AppError::NotFound(format!("entry {}", id))
}
