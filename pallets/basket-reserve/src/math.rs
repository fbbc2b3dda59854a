//! Fixed-point helpers.
//!
//! Products of two `u128` values are formed in 256 bits so that `supply × quantity` never
//! overflows before the division by the precision scalar.

use frame::deps::sp_core::U256;

/// Rounding direction for fixed-point divisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
  Down,
  Up,
}

/// `a × b / c` rounded down.
///
/// `None` when `c` is zero or the quotient does not fit in `u128`.
pub fn mul_div_floor(a: u128, b: u128, c: u128) -> Option<u128> {
  mul_div(a, b, c, Rounding::Down)
}

/// `a × b / c` rounded up.
pub fn mul_div_ceil(a: u128, b: u128, c: u128) -> Option<u128> {
  mul_div(a, b, c, Rounding::Up)
}

pub fn mul_div(a: u128, b: u128, c: u128, rounding: Rounding) -> Option<u128> {
  if c == 0 {
    return None;
  }
  // u128 × u128 always fits in 256 bits.
  let product = U256::from(a) * U256::from(b);
  let (quotient, remainder) = product.div_mod(U256::from(c));
  let quotient = match rounding {
    Rounding::Up if !remainder.is_zero() => quotient.checked_add(U256::one())?,
    _ => quotient,
  };
  if quotient > U256::from(u128::MAX) {
    return None;
  }
  Some(quotient.as_u128())
}

/// Ceiling division, `None` on a zero divisor.
pub fn div_ceil(a: u128, b: u128) -> Option<u128> {
  if b == 0 {
    return None;
  }
  Some(a.div_ceil(b))
}
