use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::common::round_half_up;
use crate::error::TaxEngineError;

/// A dollar amount held as an exact decimal.
///
/// Arithmetic never rounds; call [`Money::rounded`] when a cent-level value
/// is needed for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Wraps an exact dollar amount. Negative values are allowed here; the
    /// engine rejects them where they make no sense.
    ///
    /// # Arguments
    ///
    /// * `amount` - Dollars, with cents as the fractional part.
    ///
    /// # Examples
    ///
    /// ```
    /// use clarity_core::Money;
    /// use rust_decimal_macros::dec;
    ///
    /// let income = Money::new(dec!(75000.50));
    /// assert_eq!(income.amount(), dec!(75000.50));
    /// ```
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The unrounded dollar amount.
    ///
    /// # Returns
    ///
    /// The exact decimal this value was built from, with no cent rounding
    /// applied. Use [`Money::rounded`] for a display value.
    pub fn amount(self) -> Decimal {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Rounds to whole cents, midpoint away from zero.
    pub fn rounded(self) -> Money {
        Money(round_half_up(self.0))
    }

    /// `self / denominator` as a rate. A zero denominator yields zero.
    pub fn ratio(
        self,
        denominator: Money,
    ) -> Percentage {
        if denominator.is_zero() {
            Percentage::ZERO
        } else {
            Percentage::from_fraction(self.0 / denominator.0)
        }
    }

    /// Parses user-entered amounts such as `"75000"`, `"75,000.00"` or
    /// `"$1,234.56"`.
    ///
    /// ```
    /// use clarity_core::Money;
    /// use rust_decimal_macros::dec;
    ///
    /// assert_eq!(Money::parse(" $75,000 ").unwrap(), Money::new(dec!(75000)));
    /// assert!(Money::parse("seventy").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Money, TaxEngineError> {
        let normalized = normalize_amount_input(s);
        if normalized.is_empty() {
            return Err(TaxEngineError::InvalidAmount(s.to_string()));
        }
        normalized.parse::<Decimal>().map(Money).map_err(|e| {
            warn!(input = %s, "invalid amount: {}", e);
            TaxEngineError::InvalidAmount(s.to_string())
        })
    }
}

/// Trims whitespace, drops thousands separators and a leading dollar sign.
fn normalize_amount_input(s: &str) -> String {
    let trimmed = s.trim().replace(',', "");
    match trimmed.strip_prefix("-$") {
        Some(rest) => format!("-{rest}"),
        None => trimmed.strip_prefix('$').unwrap_or(&trimmed).to_string(),
    }
}

impl FromStr for Money {
    type Err = TaxEngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(
        self,
        rhs: Money,
    ) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(
        &mut self,
        rhs: Money,
    ) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(
        self,
        rhs: Money,
    ) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Mul<Percentage> for Money {
    type Output = Money;

    fn mul(
        self,
        rate: Percentage,
    ) -> Money {
        Money(self.0 * rate.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl fmt::Display for Money {
    /// `$75,000.00`, `-$12.50`.
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let mut cents = round_half_up(self.0.abs());
        cents.rescale(2);
        let text = cents.to_string();
        let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));
        let sign = if self.is_negative() && !cents.is_zero() { "-" } else { "" };
        write!(f, "{sign}${}.{frac}", group_thousands(whole))
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// A rate stored as a fraction: `0.22` is 22%.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(Decimal);

impl Percentage {
    pub const ZERO: Percentage = Percentage(Decimal::ZERO);

    pub const fn from_fraction(fraction: Decimal) -> Self {
        Self(fraction)
    }

    /// `from_percent(dec!(22))` is the same rate as `from_fraction(dec!(0.22))`.
    pub fn from_percent(percent: Decimal) -> Self {
        Self(percent / Decimal::ONE_HUNDRED)
    }

    pub fn fraction(self) -> Decimal {
        self.0
    }

    pub fn as_percent(self) -> Decimal {
        self.0 * Decimal::ONE_HUNDRED
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Percentage {
    /// Two decimal places: `22.00%`, `15.40%`.
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let mut percent = round_half_up(self.as_percent());
        percent.rescale(2);
        write!(f, "{percent}%")
    }
}
