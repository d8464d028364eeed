//! Decimal helpers shared by every amount in the system.
//!
//! Amounts are `rust_decimal::Decimal`; stored amounts round to two decimals,
//! half away from zero. Cross-checks between stored and recomputed values
//! accept a difference of one cent.

use rust_decimal::{Decimal, RoundingStrategy};

/// One cent. Largest accepted difference between a stored and a recomputed amount.
pub const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Decimals kept on stored amounts.
pub const AMOUNT_DECIMALS: u32 = 2;

/// Decimals kept on unit prices and conversion rates.
pub const PRICE_DECIMALS: u32 = 6;

/// Round an amount to cents.
pub fn round2(value: Decimal) -> Decimal {
    round_dp(value, AMOUNT_DECIMALS)
}

/// Round half away from zero to `dp` decimals.
pub fn round_dp(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// `base × pct / 100`, unrounded.
pub fn percent_of(base: Decimal, pct: Decimal) -> Decimal {
    base * pct / Decimal::ONE_HUNDRED
}

/// Whether two amounts agree within [`TOLERANCE`].
pub fn within_tolerance(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= TOLERANCE
}

/// Whether `value` is a valid percentage (`0..=100`).
pub fn is_percentage(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn round2_is_half_away_from_zero() {
        assert_eq!(round2(dec!(1.005)), dec!(1.01));
        assert_eq!(round2(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round2(dec!(1.004)), dec!(1.00));
    }

    #[test]
    fn percent_of_does_not_round() {
        assert_eq!(percent_of(dec!(10.01), dec!(21)), dec!(2.1021));
    }

    #[test]
    fn tolerance_is_inclusive() {
        assert!(within_tolerance(dec!(10.00), dec!(10.01)));
        assert!(!within_tolerance(dec!(10.00), dec!(10.02)));
    }

    proptest! {
        /// Property: rounding never moves a value by more than half a cent.
        #[test]
        fn round2_stays_within_half_cent(cents in -1_000_000_000i64..1_000_000_000i64, extra in 0u32..1000) {
            let value = Decimal::new(cents * 1000 + extra as i64, 5);
            let diff = (round2(value) - value).abs();
            prop_assert!(diff <= dec!(0.005));
        }
    }
}
