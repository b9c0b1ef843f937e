//! Entry persistence. `EntryStore` is the seam between the service layer and storage;
//! PostgreSQL is the production backend and the memory backend serves local runs and tests.

mod memory;
mod postgres;

pub use memory::MemoryEntryStore;
pub use postgres::{ensure_database_exists, ensure_schema, PgEntryStore};

use crate::error::AppError;
use crate::model::{Entry, EntryDraft, EntryId};
use crate::query::{EntryOrder, Window};
use crate::search::SearchTerms;
use async_trait::async_trait;

/// Row restriction shared by `count` and `fetch`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryFilter {
    pub search: Option<SearchTerms>,
}

#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Insert and return the stored record with its assigned id.
    async fn insert(&self, draft: &EntryDraft) -> Result<Entry, AppError>;

    async fn find(&self, id: EntryId) -> Result<Option<Entry>, AppError>;

    /// Overwrite the writable fields. `None` when no row has this id.
    async fn update(&self, id: EntryId, draft: &EntryDraft) -> Result<Option<Entry>, AppError>;

    /// `false` when no row had this id.
    async fn delete(&self, id: EntryId) -> Result<bool, AppError>;

    async fn count(&self, filter: &EntryFilter) -> Result<u64, AppError>;

    /// Filtered rows in `order`, sliced to `window` when given.
    async fn fetch(
        &self,
        filter: &EntryFilter,
        order: EntryOrder,
        window: Option<Window>,
    ) -> Result<Vec<Entry>, AppError>;

    /// Entries whose name has a word starting with any word of `term`, in id order.
    /// Blank terms match nothing.
    async fn search_by_term(&self, term: &str) -> Result<Vec<Entry>, AppError> {
        let Some(search) = SearchTerms::parse(term) else {
            return Ok(Vec::new());
        };
        let filter = EntryFilter { search: Some(search) };
        self.fetch(&filter, EntryOrder::default(), None).await
    }

    /// Liveness check backing `/ready`.
    async fn ping(&self) -> Result<(), AppError>;
}
