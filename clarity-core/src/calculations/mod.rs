//! Tax calculations over the reference tables.
//!
//! [`engine`] holds the public entry points; [`progressive`] is the bracket
//! walk they share.

pub mod common;
pub mod engine;
pub mod progressive;

pub use engine::{DEFAULT_COMPARISON_SET, MAX_COMPARISON_JURISDICTIONS, TaxBracketEngine};
pub use progressive::{ProgressiveTax, progressive_tax};
