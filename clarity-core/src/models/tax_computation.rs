use serde::{Deserialize, Serialize};

use crate::models::{Money, Percentage, TaxBracket};

/// Tax attributed to one bracket during a progressive walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketContribution {
    pub index: usize,
    pub bracket: TaxBracket,
    /// Portion of income that fell inside this bracket.
    pub taxable_amount: Money,
    pub tax: Money,
}

/// Result of a single tax computation. Built fresh on every call.
///
/// `marginal_rate`, `effective_rate` and `bracket_index` always describe the
/// federal schedule; jurisdiction tax only shows up in `state_tax`,
/// `total_tax` and `combined_effective_rate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxComputationResult {
    pub income: Money,
    pub marginal_rate: Percentage,
    pub effective_rate: Percentage,
    pub total_tax: Money,
    pub bracket_index: usize,
    pub federal_tax: Money,
    pub state_tax: Money,
    pub combined_effective_rate: Percentage,
    pub federal_breakdown: Vec<BracketContribution>,
}

impl TaxComputationResult {
    pub fn after_tax_income(&self) -> Money {
        self.income - self.total_tax
    }
}

/// One ranked row of a jurisdiction comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionComparisonRow {
    pub jurisdiction: String,
    pub total_tax: Money,
    pub after_tax_income: Money,
    pub state_tax: Money,
    pub qualified_dividend_rate: Percentage,
}

/// Rows ordered lowest tax first, ties broken by jurisdiction name.
///
/// The rows are owned, so the sequence can be walked any number of times.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JurisdictionComparison {
    rows: Vec<JurisdictionComparisonRow>,
}

impl JurisdictionComparison {
    /// Sorts `rows` into ranking order.
    pub fn ranked(mut rows: Vec<JurisdictionComparisonRow>) -> Self {
        rows.sort_by(|a, b| {
            a.total_tax
                .cmp(&b.total_tax)
                .then_with(|| a.jurisdiction.cmp(&b.jurisdiction))
        });
        Self { rows }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JurisdictionComparisonRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&JurisdictionComparisonRow> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&JurisdictionComparisonRow> {
        self.rows.last()
    }
}

impl IntoIterator for JurisdictionComparison {
    type Item = JurisdictionComparisonRow;
    type IntoIter = std::vec::IntoIter<JurisdictionComparisonRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a JurisdictionComparison {
    type Item = &'a JurisdictionComparisonRow;
    type IntoIter = std::slice::Iter<'a, JurisdictionComparisonRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
