use std::ops::Deref;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TaxEngineError;
use crate::models::{Money, Percentage};

/// One slice of a progressive schedule, covering `[min_income, max_income)`.
///
/// `max_income` of `None` means the bracket is unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_income: Money,
    pub max_income: Option<Money>,
    pub rate: Percentage,
}

impl TaxBracket {
    pub fn new(
        min_income: Decimal,
        max_income: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self {
            min_income: Money::new(min_income),
            max_income: max_income.map(Money::new),
            rate: Percentage::from_fraction(rate),
        }
    }

    /// True when `income` falls inside this bracket's half-open range.
    pub fn contains(
        &self,
        income: Money,
    ) -> bool {
        income >= self.min_income && self.max_income.is_none_or(|max| income < max)
    }
}

/// Brackets for one filing status, validated to be contiguous, ascending,
/// starting at zero and ending unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BracketSchedule {
    brackets: Vec<TaxBracket>,
}

impl BracketSchedule {
    /// Validates and wraps an ordered list of brackets.
    ///
    /// # Errors
    ///
    /// [`TaxEngineError::InvalidSchedule`] when the list is empty, does not
    /// start at zero, has a gap or overlap, is not strictly ascending, has a
    /// rate outside `[0, 1]`, or has an unbounded bracket anywhere but last.
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self, TaxEngineError> {
        let invalid = |reason: String| -> Result<Self, TaxEngineError> {
            Err(TaxEngineError::InvalidSchedule(reason))
        };

        let Some(first) = brackets.first() else {
            return invalid("schedule has no brackets".to_string());
        };
        if !first.min_income.is_zero() {
            return invalid(format!("first bracket starts at {}, not 0", first.min_income));
        }

        for (index, bracket) in brackets.iter().enumerate() {
            let rate = bracket.rate.fraction();
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return invalid(format!("bracket {index} has rate {rate} outside [0, 1]"));
            }

            let is_last = index + 1 == brackets.len();
            match (bracket.max_income, is_last) {
                (None, true) => {}
                (None, false) => {
                    return invalid(format!("bracket {index} is unbounded but not last"));
                }
                (Some(_), true) => {
                    return invalid("last bracket must be unbounded".to_string());
                }
                (Some(max), false) => {
                    if max <= bracket.min_income {
                        return invalid(format!(
                            "bracket {index} is empty or descending ({} to {})",
                            bracket.min_income, max
                        ));
                    }
                    let next_min = brackets[index + 1].min_income;
                    if next_min != max {
                        return invalid(format!(
                            "bracket {index} ends at {max} but bracket {} starts at {next_min}",
                            index + 1
                        ));
                    }
                }
            }
        }

        Ok(Self { brackets })
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }
}

impl Deref for BracketSchedule {
    type Target = [TaxBracket];

    fn deref(&self) -> &Self::Target {
        &self.brackets
    }
}

impl<'de> Deserialize<'de> for BracketSchedule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let brackets = Vec::<TaxBracket>::deserialize(deserializer)?;
        BracketSchedule::new(brackets).map_err(serde::de::Error::custom)
    }
}
