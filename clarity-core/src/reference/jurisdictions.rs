//! Consolidated jurisdiction profiles.
//!
//! Progressive states use their 2024 single-filer schedules for every filing
//! status. "Other" is a generic flat estimate for unlisted states.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::federal_2024::schedule_from_edges;
use crate::models::{JurisdictionTaxProfile, Percentage, QualifiedDividendTreatment, StateIncomeTax};

pub const PUERTO_RICO: &str = "Puerto Rico";
pub const OTHER: &str = "Other";

const CALIFORNIA_EDGES: [Decimal; 8] = [
    dec!(10756),
    dec!(25499),
    dec!(40245),
    dec!(55866),
    dec!(70606),
    dec!(360659),
    dec!(432787),
    dec!(721314),
];

const CALIFORNIA_RATES: [Decimal; 9] = [
    dec!(0.01),
    dec!(0.02),
    dec!(0.04),
    dec!(0.06),
    dec!(0.08),
    dec!(0.093),
    dec!(0.103),
    dec!(0.113),
    dec!(0.123),
];

const NEW_YORK_EDGES: [Decimal; 8] = [
    dec!(8500),
    dec!(11700),
    dec!(13900),
    dec!(80650),
    dec!(215400),
    dec!(1077550),
    dec!(5000000),
    dec!(25000000),
];

const NEW_YORK_RATES: [Decimal; 9] = [
    dec!(0.04),
    dec!(0.045),
    dec!(0.0525),
    dec!(0.055),
    dec!(0.06),
    dec!(0.0685),
    dec!(0.0965),
    dec!(0.103),
    dec!(0.109),
];

fn profile(
    name: &str,
    code: &str,
    state_tax: StateIncomeTax,
) -> JurisdictionTaxProfile {
    JurisdictionTaxProfile {
        name: name.to_string(),
        code: code.to_string(),
        state_tax,
        qualified_dividends: QualifiedDividendTreatment::FederalSchedule,
    }
}

fn flat(rate: Decimal) -> StateIncomeTax {
    StateIncomeTax::Flat(Percentage::from_fraction(rate))
}

pub(crate) fn profiles() -> Vec<JurisdictionTaxProfile> {
    vec![
        JurisdictionTaxProfile {
            name: PUERTO_RICO.to_string(),
            code: "PR".to_string(),
            state_tax: StateIncomeTax::None,
            qualified_dividends: QualifiedDividendTreatment::Exempt,
        },
        profile("Texas", "TX", StateIncomeTax::None),
        profile("Florida", "FL", StateIncomeTax::None),
        profile("Nevada", "NV", StateIncomeTax::None),
        profile("Washington", "WA", StateIncomeTax::None),
        profile(
            "California",
            "CA",
            StateIncomeTax::Progressive(schedule_from_edges(&CALIFORNIA_EDGES, &CALIFORNIA_RATES)),
        ),
        profile(
            "New York",
            "NY",
            StateIncomeTax::Progressive(schedule_from_edges(&NEW_YORK_EDGES, &NEW_YORK_RATES)),
        ),
        profile("Illinois", "IL", flat(dec!(0.0495))),
        profile("Pennsylvania", "PA", flat(dec!(0.0307))),
        profile(OTHER, "OTHER", flat(dec!(0.05))),
    ]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn puerto_rico_is_the_only_exempt_profile() {
        let exempt: Vec<_> = profiles()
            .into_iter()
            .filter(|p| p.qualified_dividends == QualifiedDividendTreatment::Exempt)
            .map(|p| p.name)
            .collect();

        assert_eq!(exempt, vec![PUERTO_RICO.to_string()]);
    }

    #[test]
    fn names_and_codes_are_unique() {
        let all = profiles();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert!(!a.matches(&b.name), "{} collides with {}", a.name, b.name);
                assert!(!a.matches(&b.code), "{} collides with {}", a.name, b.code);
            }
        }
    }

    #[test]
    fn progressive_states_carry_nine_brackets() {
        for profile in profiles() {
            if let Some(schedule) = profile.state_tax.bracket_table() {
                assert_eq!(schedule.len(), 9, "{}", profile.name);
            }
        }
    }
}
