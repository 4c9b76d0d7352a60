//! Decimal helpers shared by the calculations and the value types.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to cents, with exact midpoints moving away from zero.
///
/// Engine results stay exact; this is applied only when a cent-level figure
/// is shown or compared.
///
/// ```
/// use rust_decimal_macros::dec;
/// use clarity_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(3517.362)), dec!(3517.36));
/// assert_eq!(round_half_up(dec!(0.005)), dec!(0.01));
/// assert_eq!(round_half_up(dec!(-0.005)), dec!(-0.01));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// The smaller of `income` and an optional ceiling.
pub fn clamp_to_ceiling(
    income: Decimal,
    ceiling: Option<Decimal>,
) -> Decimal {
    match ceiling {
        Some(ceiling) if ceiling < income => ceiling,
        _ => income,
    }
}
