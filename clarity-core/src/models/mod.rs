mod filing_status;
mod jurisdiction;
mod money;
mod tax_bracket;
mod tax_computation;
mod tax_tables;

pub use filing_status::FilingStatus;
pub use jurisdiction::{JurisdictionTaxProfile, QualifiedDividendTreatment, StateIncomeTax};
pub use money::{Money, Percentage};
pub use tax_bracket::{BracketSchedule, TaxBracket};
pub use tax_computation::{
    BracketContribution, JurisdictionComparison, JurisdictionComparisonRow, TaxComputationResult,
};
pub use tax_tables::TaxTables;
