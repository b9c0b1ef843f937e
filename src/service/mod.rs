//! EntryService: explicit lookup, validation and persistence steps for each operation.

mod entries;
mod validation;
pub use entries::EntryService;
pub use validation::EntryValidator;
