//! Shared application state for all routes.

use crate::query::PageLimits;
use crate::store::{EntryStore, MemoryEntryStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntryStore>,
    pub limits: PageLimits,
}

impl AppState {
    pub fn new(store: Arc<dyn EntryStore>, limits: PageLimits) -> Self {
        AppState { store, limits }
    }

    /// Fresh memory-backed state with default page limits.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryEntryStore::new()), PageLimits::default())
    }
}
