//! 2024 federal schedules (Rev. Proc. 2023-34).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{BracketSchedule, FilingStatus, TaxBracket};

/// Upper edges of the 10/12/22/24/32/35% brackets; 37% above the last.
fn ordinary_edges(status: FilingStatus) -> [Decimal; 6] {
    match status {
        FilingStatus::Single => [
            dec!(11600),
            dec!(47150),
            dec!(100525),
            dec!(191950),
            dec!(243725),
            dec!(609350),
        ],
        FilingStatus::MarriedJoint => [
            dec!(23200),
            dec!(94300),
            dec!(201050),
            dec!(383900),
            dec!(487450),
            dec!(731200),
        ],
        FilingStatus::MarriedSeparate => [
            dec!(11600),
            dec!(47150),
            dec!(100525),
            dec!(191950),
            dec!(243725),
            dec!(365600),
        ],
        FilingStatus::HeadOfHousehold => [
            dec!(16550),
            dec!(63100),
            dec!(100500),
            dec!(191950),
            dec!(243700),
            dec!(609350),
        ],
    }
}

const ORDINARY_RATES: [Decimal; 7] = [
    dec!(0.10),
    dec!(0.12),
    dec!(0.22),
    dec!(0.24),
    dec!(0.32),
    dec!(0.35),
    dec!(0.37),
];

/// Where the 15% and then the 20% qualified-dividend rates begin.
fn qualified_dividend_edges(status: FilingStatus) -> [Decimal; 2] {
    match status {
        FilingStatus::Single => [dec!(47025), dec!(518900)],
        FilingStatus::MarriedJoint => [dec!(94050), dec!(583750)],
        FilingStatus::MarriedSeparate => [dec!(47025), dec!(291850)],
        FilingStatus::HeadOfHousehold => [dec!(63000), dec!(551350)],
    }
}

const QUALIFIED_DIVIDEND_RATES: [Decimal; 3] = [dec!(0), dec!(0.15), dec!(0.20)];

/// Stitches upper edges and rates into a schedule starting at zero.
///
/// `rates` must hold exactly one more entry than `edges`.
pub(crate) fn schedule_from_edges(
    edges: &[Decimal],
    rates: &[Decimal],
) -> BracketSchedule {
    debug_assert_eq!(edges.len() + 1, rates.len());

    let mut brackets = Vec::with_capacity(rates.len());
    let mut floor = Decimal::ZERO;
    for (index, rate) in rates.iter().enumerate() {
        let ceiling = edges.get(index).copied();
        brackets.push(TaxBracket::new(floor, ceiling, *rate));
        if let Some(ceiling) = ceiling {
            floor = ceiling;
        }
    }

    // Built-in edges are constants checked by the tests below.
    BracketSchedule::new(brackets).unwrap_or_else(|e| panic!("built-in schedule is invalid: {e}"))
}

pub(crate) fn ordinary_schedules() -> BTreeMap<FilingStatus, BracketSchedule> {
    FilingStatus::ALL
        .into_iter()
        .map(|status| (status, schedule_from_edges(&ordinary_edges(status), &ORDINARY_RATES)))
        .collect()
}

pub(crate) fn qualified_dividend_schedules() -> BTreeMap<FilingStatus, BracketSchedule> {
    FilingStatus::ALL
        .into_iter()
        .map(|status| {
            (
                status,
                schedule_from_edges(&qualified_dividend_edges(status), &QUALIFIED_DIVIDEND_RATES),
            )
        })
        .collect()
}
