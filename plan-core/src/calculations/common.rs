//! Common helpers for the guideline calculations.
//!
//! Percentages are expressed on a 0-100 scale throughout, matching what the
//! questionnaire displays.
//!
//! Answers are free-form, so the helpers here never panic on overflow: a
//! result that does not fit in a `Decimal` saturates at `Decimal::MAX` or
//! `Decimal::MIN` and logs a warning.

use rust_decimal::Decimal;
use tracing::warn;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// The engine keeps full precision; this is applied only when presenting
/// amounts.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use plan_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// `part` as a percentage of `whole`, or zero when `whole` is not positive.
///
/// Falls back to dividing first when `part * 100` overflows.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use plan_core::calculations::common::percentage_of;
///
/// assert_eq!(percentage_of(dec!(5000), dec!(8000)), dec!(62.5));
/// assert_eq!(percentage_of(dec!(5000), dec!(0)), dec!(0));
/// ```
pub fn percentage_of(
    part: Decimal,
    whole: Decimal,
) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_mul(HUNDRED)
        .and_then(|scaled| scaled.checked_div(whole))
        .or_else(|| part.checked_div(whole).and_then(|ratio| ratio.checked_mul(HUNDRED)))
        .unwrap_or_else(|| {
            warn!(%part, %whole, "Percentage overflowed, saturating");
            saturated(part.is_sign_negative())
        })
}

/// Applies a 0-100 percentage to an amount.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use plan_core::calculations::common::pro_rata;
///
/// assert_eq!(pro_rata(dec!(2160), dec!(62.5)), dec!(1350));
/// ```
pub fn pro_rata(
    amount: Decimal,
    percentage: Decimal,
) -> Decimal {
    amount
        .checked_mul(percentage)
        .map(|product| product / HUNDRED)
        .or_else(|| (percentage / HUNDRED).checked_mul(amount))
        .unwrap_or_else(|| {
            warn!(%amount, %percentage, "Pro-rata share overflowed, saturating");
            saturated(amount.is_sign_negative() != percentage.is_sign_negative())
        })
}

/// The extreme value on the given side of zero.
fn saturated(negative: bool) -> Decimal {
    if negative { Decimal::MIN } else { Decimal::MAX }
}
