//! CSV loading of federal bracket tables for tax years beyond the built-in set.

pub mod loader;

pub use loader::{BracketRecord, TableKind, TaxTableLoader, TaxTableLoaderError};
