//! Scaled-integer arithmetic in units of 1e18.
//!
//! All divisions truncate toward zero, the same way the contracts do. Products
//! are formed in 512 bits so no intermediate can overflow.

use primitive_types::U512;
use stakegov_shared_types::Amount;

pub use stakegov_shared_types::{precision, PRECISION};

/// `floor(a * b / denominator)`. `None` when the denominator is zero or the
/// quotient does not fit in 256 bits.
pub fn mul_div(a: Amount, b: Amount, denominator: Amount) -> Option<Amount> {
    if denominator.is_zero() {
        return None;
    }
    let quotient = a.full_mul(b) / U512::from(denominator);
    Amount::try_from(quotient).ok()
}

/// `part / whole` expressed in precision, truncated.
pub fn in_precision(part: Amount, whole: Amount) -> Option<Amount> {
    mul_div(part, precision(), whole)
}

/// `a * b < c * d`, compared exactly.
pub fn product_lt(a: Amount, b: Amount, c: Amount, d: Amount) -> bool {
    a.full_mul(b) < c.full_mul(d)
}

/// Uniform scaling helper used by the generators: `min + (max - min) * seed / scale`.
pub fn scale_between(min: Amount, max: Amount, seed: u64, scale: u64) -> Amount {
    if max <= min || scale == 0 {
        return min;
    }
    mul_div(max - min, Amount::from(seed), Amount::from(scale))
        .map(|offset| min + offset)
        .unwrap_or(min)
}
