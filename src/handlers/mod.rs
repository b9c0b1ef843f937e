//! HTTP handlers for entry CRUD and listing.

pub mod entry;
pub use entry::*;
