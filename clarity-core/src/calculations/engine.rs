//! The tax-bracket engine.
//!
//! Combines the federal ordinary schedule for a filing status with the
//! jurisdiction's own income tax, looks up the preferential rate for
//! qualified dividends, and ranks jurisdictions against each other.
//!
//! # Example
//!
//! ```
//! use clarity_core::{FilingStatus, Money, Percentage, TaxBracketEngine};
//! use rust_decimal_macros::dec;
//!
//! let engine = TaxBracketEngine::standard();
//! let income = Money::new(dec!(75000));
//!
//! let texas = engine
//!     .compute_effective_tax(income, FilingStatus::Single, "Texas")
//!     .unwrap();
//! assert_eq!(texas.total_tax, Money::new(dec!(11553)));
//! assert_eq!(texas.marginal_rate, Percentage::from_fraction(dec!(0.22)));
//!
//! let rate = engine
//!     .qualified_dividend_rate("Puerto Rico", FilingStatus::Single, income)
//!     .unwrap();
//! assert_eq!(rate, Percentage::ZERO);
//! ```

use tracing::{debug, warn};

use crate::calculations::progressive::{progressive_tax, rate_at};
use crate::error::TaxEngineError;
use crate::models::{
    BracketSchedule, FilingStatus, JurisdictionComparison, JurisdictionComparisonRow,
    JurisdictionTaxProfile, Money, Percentage, QualifiedDividendTreatment, StateIncomeTax,
    TaxComputationResult, TaxTables,
};
use crate::reference::{OTHER, PUERTO_RICO};

/// Upper bound on the number of jurisdictions a single comparison accepts.
pub const MAX_COMPARISON_JURISDICTIONS: usize = 64;

/// The jurisdictions offered side by side by default.
pub const DEFAULT_COMPARISON_SET: [&str; 6] =
    [PUERTO_RICO, "Texas", "Florida", "California", "New York", OTHER];

/// Stateless calculator over a borrowed, immutable set of [`TaxTables`].
///
/// Every method is a pure function of its arguments and the tables, so one
/// engine can be shared freely across threads.
#[derive(Debug, Clone, Copy)]
pub struct TaxBracketEngine<'a> {
    tables: &'a TaxTables,
}

impl TaxBracketEngine<'static> {
    /// Engine over the built-in 2024 tables.
    pub fn standard() -> Self {
        Self::new(TaxTables::standard())
    }
}

impl Default for TaxBracketEngine<'static> {
    fn default() -> Self {
        Self::standard()
    }
}

impl<'a> TaxBracketEngine<'a> {
    /// Creates an engine over `tables`.
    ///
    /// # Arguments
    ///
    /// * `tables` - Reference data for one tax year, built in or loaded
    ///
    /// # Examples
    ///
    /// ```
    /// use clarity_core::{TaxBracketEngine, TaxTables};
    ///
    /// let engine = TaxBracketEngine::new(TaxTables::standard());
    /// assert_eq!(engine.tables().tax_year(), 2024);
    /// ```
    pub fn new(tables: &'a TaxTables) -> Self {
        Self { tables }
    }

    /// The tables this engine reads.
    pub fn tables(&self) -> &'a TaxTables {
        self.tables
    }

    /// Federal tax plus jurisdiction tax on `income`.
    ///
    /// The marginal rate, effective rate and bracket index describe the
    /// federal schedule only.
    ///
    /// # Errors
    ///
    /// - [`TaxEngineError::InvalidIncome`] when `income` is negative.
    /// - [`TaxEngineError::UnknownJurisdiction`] when `jurisdiction` is not in
    ///   the profile table. There is no fallback profile.
    /// - [`TaxEngineError::UnknownFilingStatus`] when the tables carry no
    ///   schedule for `filing_status`.
    pub fn compute_effective_tax(
        &self,
        income: Money,
        filing_status: FilingStatus,
        jurisdiction: &str,
    ) -> Result<TaxComputationResult, TaxEngineError> {
        validate_income(income)?;
        let schedule = self.tables.ordinary_schedule(filing_status)?;
        let profile = self.tables.jurisdiction(jurisdiction)?;

        let federal = progressive_tax(schedule, income);
        let effective_rate = federal.total.ratio(income);
        let state_tax = jurisdiction_tax(&profile.state_tax, income);
        let total_tax = federal.total + state_tax;

        debug!(
            %income,
            filing_status = filing_status.code(),
            jurisdiction = %profile.name,
            federal_tax = %federal.total,
            %state_tax,
            bracket_index = federal.bracket_index,
            "computed effective tax"
        );

        Ok(TaxComputationResult {
            income,
            marginal_rate: federal.marginal_rate,
            effective_rate,
            total_tax,
            bracket_index: federal.bracket_index,
            federal_tax: federal.total,
            state_tax,
            combined_effective_rate: total_tax.ratio(income),
            federal_breakdown: federal.contributions,
        })
    }

    /// Preferential rate applied to qualified dividends.
    ///
    /// Exempt jurisdictions (Puerto Rico under Act 60) return zero before any
    /// income threshold is consulted. Everywhere else the rate comes from the
    /// federal 0/15/20% threshold schedule, which is separate from the
    /// ordinary-income brackets.
    ///
    /// # Errors
    ///
    /// Same validation as [`Self::compute_effective_tax`].
    pub fn qualified_dividend_rate(
        &self,
        jurisdiction: &str,
        filing_status: FilingStatus,
        income: Money,
    ) -> Result<Percentage, TaxEngineError> {
        validate_income(income)?;
        let profile = self.tables.jurisdiction(jurisdiction)?;

        if profile.qualified_dividends == QualifiedDividendTreatment::Exempt {
            debug!(jurisdiction = %profile.name, "qualified dividends exempt");
            return Ok(Percentage::ZERO);
        }

        let schedule = self.tables.qualified_dividend_schedule(filing_status)?;
        Ok(rate_at(schedule, income))
    }

    /// Tax owed on `dividends` of qualified dividend income for a taxpayer
    /// with `income` of taxable income.
    ///
    /// # Arguments
    ///
    /// * `jurisdiction` - Name or code of the taxpayer's jurisdiction
    /// * `filing_status` - Selects the dividend threshold schedule
    /// * `income` - Taxable income used to find the dividend rate
    /// * `dividends` - Qualified dividend amount the rate is applied to
    ///
    /// # Returns
    ///
    /// `dividends` times the rate from [`Self::qualified_dividend_rate`].
    ///
    /// # Errors
    ///
    /// Everything [`Self::qualified_dividend_rate`] rejects, then
    /// [`TaxEngineError::InvalidDividends`] when `dividends` is negative.
    pub fn dividend_tax(
        &self,
        jurisdiction: &str,
        filing_status: FilingStatus,
        income: Money,
        dividends: Money,
    ) -> Result<Money, TaxEngineError> {
        let rate = self.qualified_dividend_rate(jurisdiction, filing_status, income)?;
        if dividends.is_negative() {
            warn!(%dividends, "rejected negative dividends");
            return Err(TaxEngineError::InvalidDividends(dividends.amount()));
        }
        Ok(dividends * rate)
    }

    /// Computes each jurisdiction and ranks them lowest tax first, ties by
    /// name. One row per requested entry, duplicates included.
    ///
    /// # Errors
    ///
    /// - [`TaxEngineError::TooManyJurisdictions`] beyond
    ///   [`MAX_COMPARISON_JURISDICTIONS`] entries.
    /// - The first error any single row produces.
    pub fn compare_jurisdictions<S: AsRef<str>>(
        &self,
        income: Money,
        filing_status: FilingStatus,
        jurisdictions: &[S],
    ) -> Result<JurisdictionComparison, TaxEngineError> {
        if jurisdictions.len() > MAX_COMPARISON_JURISDICTIONS {
            return Err(TaxEngineError::TooManyJurisdictions {
                requested: jurisdictions.len(),
                limit: MAX_COMPARISON_JURISDICTIONS,
            });
        }

        let rows = jurisdictions
            .iter()
            .map(|name| self.comparison_row(income, filing_status, name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(JurisdictionComparison::ranked(rows))
    }

    fn comparison_row(
        &self,
        income: Money,
        filing_status: FilingStatus,
        jurisdiction: &str,
    ) -> Result<JurisdictionComparisonRow, TaxEngineError> {
        let result = self.compute_effective_tax(income, filing_status, jurisdiction)?;
        let qualified_dividend_rate =
            self.qualified_dividend_rate(jurisdiction, filing_status, income)?;
        let profile = self.tables.jurisdiction(jurisdiction)?;

        Ok(JurisdictionComparisonRow {
            jurisdiction: profile.name.clone(),
            total_tax: result.total_tax,
            after_tax_income: result.after_tax_income(),
            state_tax: result.state_tax,
            qualified_dividend_rate,
        })
    }

    /// Ordinary-income schedule for `filing_status`.
    pub fn bracket_schedule(
        &self,
        filing_status: FilingStatus,
    ) -> Result<&'a BracketSchedule, TaxEngineError> {
        self.tables.ordinary_schedule(filing_status)
    }

    /// Looks up a jurisdiction profile by name or postal code,
    /// case-insensitively.
    ///
    /// # Errors
    ///
    /// [`TaxEngineError::UnknownJurisdiction`] when nothing matches.
    pub fn jurisdiction(
        &self,
        name: &str,
    ) -> Result<&'a JurisdictionTaxProfile, TaxEngineError> {
        self.tables.jurisdiction(name)
    }
}

fn validate_income(income: Money) -> Result<(), TaxEngineError> {
    if income.is_negative() {
        warn!(%income, "rejected negative income");
        return Err(TaxEngineError::InvalidIncome(income.amount()));
    }
    Ok(())
}

fn jurisdiction_tax(
    state_tax: &StateIncomeTax,
    income: Money,
) -> Money {
    match state_tax {
        StateIncomeTax::None => Money::ZERO,
        StateIncomeTax::Flat(rate) => income * *rate,
        StateIncomeTax::Progressive(schedule) => progressive_tax(schedule, income).total,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;

    fn money(amount: Decimal) -> Money {
        Money::new(amount)
    }

    fn rate(fraction: Decimal) -> Percentage {
        Percentage::from_fraction(fraction)
    }

    // =========================================================================
    // compute_effective_tax
    // =========================================================================

    #[test]
    fn texas_is_federal_only() {
        let engine = TaxBracketEngine::standard();

        let result = engine
            .compute_effective_tax(money(dec!(75000)), FilingStatus::Single, "Texas")
            .unwrap();

        assert_eq!(result.state_tax, Money::ZERO);
        assert_eq!(result.federal_tax, money(dec!(11553)));
        assert_eq!(result.total_tax, money(dec!(11553)));
        assert_eq!(result.bracket_index, 2);
        assert_eq!(result.marginal_rate, rate(dec!(0.22)));
        assert!(result.effective_rate < result.marginal_rate);
        assert_eq!(result.effective_rate.to_string(), "15.40%");
    }

    #[test]
    fn california_adds_progressive_state_tax() {
        let engine = TaxBracketEngine::standard();

        let result = engine
            .compute_effective_tax(money(dec!(75000)), FilingStatus::Single, "California")
            .unwrap();

        // 107.56 + 294.86 + 589.84 + 937.26 + 1179.20 + 408.642
        assert_eq!(result.state_tax, money(dec!(3517.362)));
        assert_eq!(result.total_tax, money(dec!(15070.362)));
        assert_eq!(result.total_tax.rounded(), money(dec!(15070.36)));
        assert_eq!(result.marginal_rate, rate(dec!(0.22)));
    }

    #[test]
    fn new_york_adds_progressive_state_tax() {
        let engine = TaxBracketEngine::standard();

        let result = engine
            .compute_effective_tax(money(dec!(75000)), FilingStatus::Single, "NY")
            .unwrap();

        // 340 + 144 + 115.50 + 3360.50
        assert_eq!(result.state_tax, money(dec!(3960.00)));
    }

    #[test]
    fn flat_rate_state_multiplies_income() {
        let engine = TaxBracketEngine::standard();

        let result = engine
            .compute_effective_tax(money(dec!(100000)), FilingStatus::MarriedJoint, "Illinois")
            .unwrap();

        assert_eq!(result.state_tax, money(dec!(4950.00)));
    }

    #[test]
    fn zero_income_yields_zero_everything() {
        let engine = TaxBracketEngine::standard();

        let result = engine
            .compute_effective_tax(Money::ZERO, FilingStatus::Single, "Texas")
            .unwrap();

        assert_eq!(result.total_tax, Money::ZERO);
        assert_eq!(result.effective_rate, Percentage::ZERO);
        assert_eq!(result.marginal_rate, Percentage::ZERO);
        assert_eq!(result.bracket_index, 0);
        assert_eq!(result.combined_effective_rate, Percentage::ZERO);
    }

    #[test]
    fn negative_income_is_rejected() {
        let engine = TaxBracketEngine::standard();

        let result = engine.compute_effective_tax(money(dec!(-100)), FilingStatus::Single, "Texas");

        assert_eq!(result, Err(TaxEngineError::InvalidIncome(dec!(-100))));
    }

    #[test]
    fn unknown_jurisdiction_is_rejected() {
        let engine = TaxBracketEngine::standard();

        let result = engine.compute_effective_tax(money(dec!(1000)), FilingStatus::Single, "Narnia");

        assert_eq!(
            result,
            Err(TaxEngineError::UnknownJurisdiction("Narnia".to_string()))
        );
    }

    #[test]
    fn missing_filing_status_schedule_is_rejected() {
        let standard = TaxTables::standard();
        let mut ordinary = BTreeMap::new();
        ordinary.insert(
            FilingStatus::Single,
            standard.ordinary_schedule(FilingStatus::Single).unwrap().clone(),
        );
        let tables = TaxTables::new(2024, ordinary, BTreeMap::new(), standard.jurisdictions().to_vec());
        let engine = TaxBracketEngine::new(&tables);

        let result =
            engine.compute_effective_tax(money(dec!(1000)), FilingStatus::MarriedJoint, "Texas");

        assert_eq!(result, Err(TaxEngineError::UnknownFilingStatus("MFJ".to_string())));
    }

    #[test]
    fn head_of_household_uses_its_own_schedule() {
        let engine = TaxBracketEngine::standard();

        let result = engine
            .compute_effective_tax(money(dec!(60000)), FilingStatus::HeadOfHousehold, "Florida")
            .unwrap();

        // 1655 + (60000 - 16550) * 0.12
        assert_eq!(result.federal_tax, money(dec!(6869.00)));
        assert_eq!(result.bracket_index, 1);
    }

    // =========================================================================
    // qualified_dividend_rate
    // =========================================================================

    #[test]
    fn puerto_rico_dividends_are_exempt_at_any_income() {
        let engine = TaxBracketEngine::standard();

        for status in FilingStatus::ALL {
            for income in [dec!(0), dec!(75000), dec!(600000), dec!(1000000000)] {
                let result = engine
                    .qualified_dividend_rate("Puerto Rico", status, money(income))
                    .unwrap();
                assert_eq!(result, Percentage::ZERO, "{status} at {income}");
            }
        }
    }

    #[test]
    fn mainland_dividend_rate_follows_thresholds() {
        let engine = TaxBracketEngine::standard();
        let single = FilingStatus::Single;

        assert_eq!(
            engine.qualified_dividend_rate("Texas", single, money(dec!(40000))).unwrap(),
            Percentage::ZERO
        );
        assert_eq!(
            engine.qualified_dividend_rate("Texas", single, money(dec!(75000))).unwrap(),
            rate(dec!(0.15))
        );
        assert_eq!(
            engine.qualified_dividend_rate("California", single, money(dec!(600000))).unwrap(),
            rate(dec!(0.20))
        );
    }

    #[test]
    fn dividend_threshold_edge_moves_to_upper_tier() {
        let engine = TaxBracketEngine::standard();

        let result = engine
            .qualified_dividend_rate("Florida", FilingStatus::MarriedJoint, money(dec!(94050)))
            .unwrap();

        assert_eq!(result, rate(dec!(0.15)));
    }

    #[test]
    fn dividend_rate_rejects_unknown_jurisdiction_and_negative_income() {
        let engine = TaxBracketEngine::standard();

        assert_eq!(
            engine.qualified_dividend_rate("Mars", FilingStatus::Single, money(dec!(1))),
            Err(TaxEngineError::UnknownJurisdiction("Mars".to_string()))
        );
        assert_eq!(
            engine.qualified_dividend_rate("Texas", FilingStatus::Single, money(dec!(-1))),
            Err(TaxEngineError::InvalidIncome(dec!(-1)))
        );
    }

    #[test]
    fn dividend_tax_applies_rate_to_dividends() {
        let engine = TaxBracketEngine::standard();

        let texas = engine
            .dividend_tax("Texas", FilingStatus::Single, money(dec!(75000)), money(dec!(2000)))
            .unwrap();
        let puerto_rico = engine
            .dividend_tax("PR", FilingStatus::Single, money(dec!(75000)), money(dec!(2000)))
            .unwrap();

        assert_eq!(texas, money(dec!(300.00)));
        assert_eq!(puerto_rico, Money::ZERO);
    }

    #[test]
    fn negative_dividends_are_blamed_on_dividends() {
        let engine = TaxBracketEngine::standard();

        let err = engine
            .dividend_tax("Texas", FilingStatus::Single, money(dec!(75000)), money(dec!(-5)))
            .unwrap_err();

        assert_eq!(err, TaxEngineError::InvalidDividends(dec!(-5)));
        assert_eq!(err.field(), "dividends");
    }

    #[test]
    fn negative_income_is_reported_before_negative_dividends() {
        let engine = TaxBracketEngine::standard();

        let err = engine
            .dividend_tax("PR", FilingStatus::Single, money(dec!(-1)), money(dec!(-5)))
            .unwrap_err();

        assert_eq!(err, TaxEngineError::InvalidIncome(dec!(-1)));
    }

    #[test]
    fn zero_dividends_owe_nothing() {
        let engine = TaxBracketEngine::standard();

        let tax = engine
            .dividend_tax("Texas", FilingStatus::Single, money(dec!(900000)), Money::ZERO)
            .unwrap();

        assert_eq!(tax, Money::ZERO);
    }

    // =========================================================================
    // compare_jurisdictions
    // =========================================================================

    #[test]
    fn comparison_ranks_lowest_tax_first() {
        let engine = TaxBracketEngine::standard();

        let comparison = engine
            .compare_jurisdictions(
                money(dec!(75000)),
                FilingStatus::Single,
                &["Puerto Rico", "Texas", "California", "New York"],
            )
            .unwrap();

        let names: Vec<_> = comparison.iter().map(|row| row.jurisdiction.as_str()).collect();
        assert_eq!(names, vec!["Puerto Rico", "Texas", "California", "New York"]);
        assert_eq!(comparison.last().unwrap().total_tax, money(dec!(15513.00)));
        assert_eq!(
            comparison.first().unwrap().after_tax_income,
            money(dec!(63447.00))
        );
    }

    #[test]
    fn comparison_uses_canonical_names_and_keeps_duplicates() {
        let engine = TaxBracketEngine::standard();

        let comparison = engine
            .compare_jurisdictions(money(dec!(50000)), FilingStatus::Single, &["tx", "TX", "fl"])
            .unwrap();

        let names: Vec<_> = comparison.iter().map(|row| row.jurisdiction.as_str()).collect();
        assert_eq!(names, vec!["Florida", "Texas", "Texas"]);
    }

    #[test]
    fn comparison_fails_on_any_unknown_jurisdiction() {
        let engine = TaxBracketEngine::standard();

        let result =
            engine.compare_jurisdictions(money(dec!(50000)), FilingStatus::Single, &["Texas", "Oz"]);

        assert_eq!(result, Err(TaxEngineError::UnknownJurisdiction("Oz".to_string())));
    }

    #[test]
    fn comparison_of_nothing_is_empty() {
        let engine = TaxBracketEngine::standard();
        let none: [&str; 0] = [];

        let comparison = engine
            .compare_jurisdictions(money(dec!(50000)), FilingStatus::Single, &none)
            .unwrap();

        assert!(comparison.is_empty());
    }

    #[test]
    fn comparison_rejects_oversized_input() {
        let engine = TaxBracketEngine::standard();
        let many = vec!["Texas"; MAX_COMPARISON_JURISDICTIONS + 1];

        let result = engine.compare_jurisdictions(money(dec!(50000)), FilingStatus::Single, &many);

        assert_eq!(
            result,
            Err(TaxEngineError::TooManyJurisdictions {
                requested: MAX_COMPARISON_JURISDICTIONS + 1,
                limit: MAX_COMPARISON_JURISDICTIONS,
            })
        );
    }

    #[test]
    fn default_comparison_set_resolves() {
        let engine = TaxBracketEngine::standard();

        let comparison = engine
            .compare_jurisdictions(money(dec!(120000)), FilingStatus::MarriedJoint, &DEFAULT_COMPARISON_SET)
            .unwrap();

        assert_eq!(comparison.len(), DEFAULT_COMPARISON_SET.len());
    }
}
