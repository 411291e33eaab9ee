//! Pricing Module
//!
//! Pure price arithmetic for the storefront:
//! - [`configurator`] - sushi box / poke bowl additive pricing
//! - [`promotion`] - day/time promotion matching and discounts
//! - [`checkout`] - order totals (subtotal, tax, fee, discount, tip)
//!
//! Amounts travel as `f64` and are computed with `rust_decimal`, rounded to
//! 2 decimal places (half away from zero).

pub mod checkout;
pub mod configurator;
pub mod promotion;

pub use checkout::*;
pub use configurator::*;
pub use promotion::*;

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_default()
}

#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Round an f64 amount to cents
pub fn round2(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

/// How prices relate to TVA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxMode {
    /// Menu prices are TTC: tax is shown but already part of the subtotal
    Inclusive,
    /// Menu prices are HT: tax is added on top of the subtotal
    Exclusive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(2.344), 2.34);
        assert_eq!(round2(0.1 + 0.2), 0.3);
    }

    #[test]
    fn nan_collapses_to_zero() {
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
    }
}
