//! Domain types for ledger entries.

pub mod entry;

pub use entry::*;
