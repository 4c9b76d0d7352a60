//! Built-in reference data.

mod federal_2024;
pub mod jurisdictions;

use std::sync::LazyLock;

use crate::models::TaxTables;

pub use jurisdictions::{OTHER, PUERTO_RICO};

static STANDARD_TABLES: LazyLock<TaxTables> = LazyLock::new(|| {
    TaxTables::new(
        2024,
        federal_2024::ordinary_schedules(),
        federal_2024::qualified_dividend_schedules(),
        jurisdictions::profiles(),
    )
});

pub(crate) fn standard_tables() -> &'static TaxTables {
    &STANDARD_TABLES
}

/// Jurisdiction profiles that ship with the crate, for callers that build
/// their own federal tables.
pub fn standard_jurisdictions() -> Vec<crate::models::JurisdictionTaxProfile> {
    jurisdictions::profiles()
}
