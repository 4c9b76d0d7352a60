use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TaxEngineError;

/// Federal filing status; selects which bracket schedule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Single,
    MarriedJoint,
    MarriedSeparate,
    HeadOfHousehold,
}

impl FilingStatus {
    pub const ALL: [FilingStatus; 4] = [
        Self::Single,
        Self::MarriedJoint,
        Self::MarriedSeparate,
        Self::HeadOfHousehold,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Single => "S",
            Self::MarriedJoint => "MFJ",
            Self::MarriedSeparate => "MFS",
            Self::HeadOfHousehold => "HOH",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::MarriedJoint => "Married Filing Jointly",
            Self::MarriedSeparate => "Married Filing Separately",
            Self::HeadOfHousehold => "Head of Household",
        }
    }

    /// Accepts the short codes (`S`, `MFJ`, `MFS`, `HOH`) and the common
    /// spellings of each status, ignoring case, `-`, `_` and spaces.
    pub fn parse(s: &str) -> Option<Self> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "s" | "single" => Some(Self::Single),
            "mfj" | "marriedjoint" | "marriedfilingjointly" | "joint" => Some(Self::MarriedJoint),
            "mfs" | "marriedseparate" | "marriedfilingseparately" | "separate" => {
                Some(Self::MarriedSeparate)
            }
            "hoh" | "headofhousehold" => Some(Self::HeadOfHousehold),
            _ => None,
        }
    }
}

impl FromStr for FilingStatus {
    type Err = TaxEngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| TaxEngineError::UnknownFilingStatus(s.to_string()))
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}
