//! Money helpers
//!
//! Amounts are `rust_decimal::Decimal` in the domain and integer minor units
//! (paise) in storage.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fractional digits kept for every money value.
pub const MONEY_SCALE: u32 = 2;

/// Round to the money scale, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert to integer minor units for storage. `None` on overflow.
pub fn to_minor_units(value: Decimal) -> Option<i64> {
    (round_money(value) * Decimal::ONE_HUNDRED).to_i64()
}

pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, MONEY_SCALE)
}
