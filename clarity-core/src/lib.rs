pub mod calculations;
pub mod error;
pub mod models;
pub mod reference;

pub use calculations::{DEFAULT_COMPARISON_SET, MAX_COMPARISON_JURISDICTIONS, TaxBracketEngine};
pub use error::TaxEngineError;
pub use models::*;
