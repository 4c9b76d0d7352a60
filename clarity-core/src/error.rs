use rust_decimal::Decimal;
use thiserror::Error;

/// Errors returned by the tax engine and its value types.
///
/// Every variant is an input-validation failure: the same input always fails
/// the same way, and each one maps back to a single offending input field
/// (see [`TaxEngineError::field`]).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxEngineError {
    /// Income was negative.
    #[error("income must not be negative (got {0})")]
    InvalidIncome(Decimal),

    /// A qualified dividend amount was negative.
    #[error("dividends must not be negative (got {0})")]
    InvalidDividends(Decimal),

    /// The filing status text was not recognised, or the active tables do
    /// not carry a schedule for it.
    #[error("unknown filing status '{0}'")]
    UnknownFilingStatus(String),

    /// The jurisdiction is not present in the profile table.
    #[error("unknown jurisdiction '{0}'")]
    UnknownJurisdiction(String),

    /// A bracket schedule violated its ordering or coverage invariants.
    #[error("invalid bracket schedule: {0}")]
    InvalidSchedule(String),

    /// A comparison was requested for more jurisdictions than allowed.
    #[error("too many jurisdictions to compare: {requested} (limit {limit})")]
    TooManyJurisdictions { requested: usize, limit: usize },

    /// Free-form amount text could not be parsed as money.
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
}

impl TaxEngineError {
    /// Name of the input field the error should be reported against.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidIncome(_) | Self::InvalidAmount(_) => "income",
            Self::InvalidDividends(_) => "dividends",
            Self::UnknownFilingStatus(_) => "filing_status",
            Self::UnknownJurisdiction(_) | Self::TooManyJurisdictions { .. } => "jurisdiction",
            Self::InvalidSchedule(_) => "tables",
        }
    }
}
