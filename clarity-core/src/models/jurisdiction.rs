use serde::{Deserialize, Serialize};

use crate::models::{BracketSchedule, Percentage};

/// How a jurisdiction taxes ordinary income on top of the federal schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StateIncomeTax {
    None,
    Flat(Percentage),
    Progressive(BracketSchedule),
}

impl StateIncomeTax {
    pub fn has_income_tax(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn flat_rate(&self) -> Option<Percentage> {
        match self {
            Self::Flat(rate) => Some(*rate),
            _ => None,
        }
    }

    pub fn bracket_table(&self) -> Option<&BracketSchedule> {
        match self {
            Self::Progressive(schedule) => Some(schedule),
            _ => None,
        }
    }
}

/// Which rate applies to qualified dividends for residents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualifiedDividendTreatment {
    /// The federal 0/15/20% threshold schedule.
    FederalSchedule,
    /// Fully exempt regardless of income (Puerto Rico, Act 60).
    Exempt,
}

/// Tax profile of a single jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionTaxProfile {
    pub name: String,
    /// Postal code, or a short tag for the generic profile.
    pub code: String,
    pub state_tax: StateIncomeTax,
    pub qualified_dividends: QualifiedDividendTreatment,
}

impl JurisdictionTaxProfile {
    /// Case-insensitive match on either the name or the code.
    pub fn matches(
        &self,
        query: &str,
    ) -> bool {
        let query = query.trim();
        self.name.eq_ignore_ascii_case(query) || self.code.eq_ignore_ascii_case(query)
    }

    pub fn has_income_tax(&self) -> bool {
        self.state_tax.has_income_tax()
    }
}
