use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TaxEngineError;
use crate::models::{BracketSchedule, FilingStatus, JurisdictionTaxProfile};
use crate::reference;

/// Reference data read by the engine: one tax year's federal schedules plus
/// the jurisdiction profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxTables {
    tax_year: i32,
    ordinary: BTreeMap<FilingStatus, BracketSchedule>,
    qualified_dividend: BTreeMap<FilingStatus, BracketSchedule>,
    jurisdictions: Vec<JurisdictionTaxProfile>,
}

impl TaxTables {
    /// Assembles tables from already validated schedules.
    ///
    /// Nothing is cross-checked here: a filing status missing from either
    /// map is reported by the schedule lookups instead.
    ///
    /// # Arguments
    ///
    /// * `tax_year` - Year the federal schedules apply to.
    /// * `ordinary` - Ordinary-income schedule per filing status.
    /// * `qualified_dividend` - Qualified-dividend thresholds per filing status.
    /// * `jurisdictions` - Profiles searchable by name or code.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    ///
    /// use clarity_core::{FilingStatus, TaxTables};
    ///
    /// let single = TaxTables::standard()
    ///     .ordinary_schedule(FilingStatus::Single)
    ///     .unwrap()
    ///     .clone();
    /// let tables = TaxTables::new(2024, BTreeMap::from([(FilingStatus::Single, single)]), BTreeMap::new(), Vec::new());
    ///
    /// assert!(tables.ordinary_schedule(FilingStatus::Single).is_ok());
    /// assert!(tables.qualified_dividend_schedule(FilingStatus::Single).is_err());
    /// assert!(tables.jurisdiction("Texas").is_err());
    /// ```
    pub fn new(
        tax_year: i32,
        ordinary: BTreeMap<FilingStatus, BracketSchedule>,
        qualified_dividend: BTreeMap<FilingStatus, BracketSchedule>,
        jurisdictions: Vec<JurisdictionTaxProfile>,
    ) -> Self {
        Self {
            tax_year,
            ordinary,
            qualified_dividend,
            jurisdictions,
        }
    }

    /// The built-in 2024 tables, shared by the whole process.
    pub fn standard() -> &'static TaxTables {
        reference::standard_tables()
    }

    pub fn tax_year(&self) -> i32 {
        self.tax_year
    }

    /// Ordinary-income federal schedule for `status`.
    pub fn ordinary_schedule(
        &self,
        status: FilingStatus,
    ) -> Result<&BracketSchedule, TaxEngineError> {
        self.ordinary
            .get(&status)
            .ok_or_else(|| TaxEngineError::UnknownFilingStatus(status.code().to_string()))
    }

    /// Qualified-dividend threshold schedule for `status`.
    pub fn qualified_dividend_schedule(
        &self,
        status: FilingStatus,
    ) -> Result<&BracketSchedule, TaxEngineError> {
        self.qualified_dividend
            .get(&status)
            .ok_or_else(|| TaxEngineError::UnknownFilingStatus(status.code().to_string()))
    }

    /// Looks a jurisdiction up by name or code, ignoring case.
    pub fn jurisdiction(
        &self,
        name: &str,
    ) -> Result<&JurisdictionTaxProfile, TaxEngineError> {
        self.jurisdictions
            .iter()
            .find(|profile| profile.matches(name))
            .ok_or_else(|| TaxEngineError::UnknownJurisdiction(name.trim().to_string()))
    }

    pub fn jurisdictions(&self) -> &[JurisdictionTaxProfile] {
        &self.jurisdictions
    }
}
