//! Progressive bracket walk shared by the federal and jurisdiction schedules.
//!
//! Each bracket taxes only the slice of income inside `[min, max)`. Income
//! sitting exactly on an edge belongs to the upper bracket, so the marginal
//! dollar is taxed at that bracket's rate even though the bracket itself
//! contributes nothing.

use crate::calculations::common::clamp_to_ceiling;
use crate::models::{BracketContribution, BracketSchedule, Money, Percentage};

/// Output of [`progressive_tax`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressiveTax {
    pub total: Money,
    pub marginal_rate: Percentage,
    pub bracket_index: usize,
    /// One row per bracket from the bottom up to and including the marginal one.
    pub contributions: Vec<BracketContribution>,
}

impl ProgressiveTax {
    fn nothing() -> Self {
        Self {
            total: Money::ZERO,
            marginal_rate: Percentage::ZERO,
            bracket_index: 0,
            contributions: Vec::new(),
        }
    }
}

/// Index of the bracket whose half-open range holds `income`.
///
/// The top bracket is unbounded, so only income below zero misses every
/// bracket; it maps to the first one.
fn containing_index(
    schedule: &BracketSchedule,
    income: Money,
) -> usize {
    schedule
        .iter()
        .position(|bracket| bracket.contains(income))
        .unwrap_or(0)
}

/// Taxes `income` against `schedule`.
///
/// Income of zero or less produces zero tax, a zero marginal rate and
/// bracket index 0. Arithmetic is exact; nothing is rounded.
///
/// ```
/// use clarity_core::calculations::progressive::progressive_tax;
/// use clarity_core::{FilingStatus, Money, TaxTables};
/// use rust_decimal_macros::dec;
///
/// let single = TaxTables::standard().ordinary_schedule(FilingStatus::Single).unwrap();
/// let tax = progressive_tax(single, Money::new(dec!(75000)));
///
/// assert_eq!(tax.total, Money::new(dec!(11553)));
/// assert_eq!(tax.bracket_index, 2);
/// ```
pub fn progressive_tax(
    schedule: &BracketSchedule,
    income: Money,
) -> ProgressiveTax {
    if income <= Money::ZERO {
        return ProgressiveTax::nothing();
    }

    let marginal_index = containing_index(schedule, income);
    let mut total = Money::ZERO;
    let mut contributions = Vec::with_capacity(marginal_index + 1);

    for (index, bracket) in schedule.iter().enumerate().take(marginal_index + 1) {
        let top = clamp_to_ceiling(income.amount(), bracket.max_income.map(Money::amount));
        let taxable_amount = Money::new(top) - bracket.min_income;
        let tax = taxable_amount * bracket.rate;
        total += tax;

        contributions.push(BracketContribution {
            index,
            bracket: bracket.clone(),
            taxable_amount,
            tax,
        });
    }

    ProgressiveTax {
        total,
        marginal_rate: schedule[marginal_index].rate,
        bracket_index: marginal_index,
        contributions,
    }
}

/// Rate of the bracket holding `income`; income below zero reads the first bracket.
pub fn rate_at(
    schedule: &BracketSchedule,
    income: Money,
) -> Percentage {
    schedule[containing_index(schedule, income)].rate
}
