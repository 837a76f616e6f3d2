use rust_decimal::{Decimal, RoundingStrategy};

pub const CURRENCY_SCALE: u32 = 2;

/// Half-up to cents, with midpoints away from zero like a spreadsheet's `ROUND`.
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Quotient that collapses to zero instead of faulting on a non-positive divisor.
/// A quotient beyond `Decimal` range also saturates to zero; request parsing rejects
/// coefficients small enough to reach it.
pub fn divide_or_zero(numerator: Decimal, divisor: Decimal) -> Decimal {
    if divisor <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    numerator.checked_div(divisor).unwrap_or(Decimal::ZERO)
}
