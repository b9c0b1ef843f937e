//! Ledger API: CRUD over ledger entries with paginated, sorted and searchable listings.

pub mod error;
pub mod handlers;
pub mod model;
pub mod query;
pub mod response;
pub mod routes;
pub mod search;
pub mod seed;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;

pub use error::{AppError, ConfigError, FieldErrors, QueryError};
pub use model::{Entry, EntryChanges, EntryColumn, EntryDraft, EntryId};
pub use query::{ListParams, ListQuery, Listing, PageLimits, SortDirection};
pub use routes::{app, common_routes, entry_routes, API_PREFIX, DEFAULT_BODY_LIMIT};
pub use service::EntryService;
pub use settings::{Settings, StoreBackend};
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_schema, EntryStore, MemoryEntryStore, PgEntryStore};
