//! Redemption throttle ("battery").
//!
//! A leaky bucket measured in blocks. Charge refills linearly over `window_steps` up to
//! `max_fraction × last_supply` and is spent by net supply contraction between two advances.
//! Contraction beyond the charge is rejected, never clamped.

use crate::{
  math,
  types::{Balance, BatteryState},
};
use frame::deps::sp_runtime::{
  PerThing, Perbill,
  traits::{AtLeast32BitUnsigned, Saturating, UniqueSaturatedInto},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatteryError {
  /// Supply shrank by more than the available charge
  InsufficientCharge,
  /// A zero-length window cannot refill
  InvalidWindow,
}

impl<T> From<BatteryError> for crate::Error<T> {
  fn from(error: BatteryError) -> Self {
    match error {
      BatteryError::InsufficientCharge => crate::Error::<T>::InsufficientCharge,
      BatteryError::InvalidWindow => crate::Error::<T>::InvalidConfiguration,
    }
  }
}

impl<BlockNumber: AtLeast32BitUnsigned + Copy> BatteryState<BlockNumber> {
  /// Battery observed at `now` with `supply` outstanding, either empty or at capacity.
  pub fn new(now: BlockNumber, supply: Balance, max_fraction: Perbill, full: bool) -> Self {
    let charge = if full { max_fraction.mul_floor(supply) } else { 0 };
    Self {
      last_step: now,
      last_supply: supply,
      charge,
    }
  }

  pub fn capacity(&self, max_fraction: Perbill) -> Balance {
    max_fraction.mul_floor(self.last_supply)
  }

  /// Charge after refilling up to `now`, before any contraction is applied.
  pub fn replenished(
    &self,
    now: BlockNumber,
    max_fraction: Perbill,
    window_steps: u32,
  ) -> Result<Balance, BatteryError> {
    if window_steps == 0 {
      return Err(BatteryError::InvalidWindow);
    }
    let elapsed: u128 = now.saturating_sub(self.last_step).unique_saturated_into();
    let capacity = self.capacity(max_fraction);
    // Past one full window the bucket is full anyway.
    let refill =
      math::mul_div_floor(capacity, elapsed, window_steps as u128).unwrap_or(capacity);
    Ok(self.charge.saturating_add(refill).min(capacity))
  }

  /// Refill up to `now`, then spend the contraction from `last_supply` to `current_supply`.
  ///
  /// On error `self` is left untouched.
  pub fn advance(
    &mut self,
    now: BlockNumber,
    current_supply: Balance,
    max_fraction: Perbill,
    window_steps: u32,
  ) -> Result<(), BatteryError> {
    self.advance_across(now, current_supply, current_supply, max_fraction, window_steps)
  }

  /// Like [`Self::advance`], for an interval where supply moved from `opening_supply` to
  /// `closing_supply` after growing or shrinking since the last advance.
  ///
  /// Supply contraction before the opening and between opening and closing is spent
  /// separately, so growth before the opening never nets out a later contraction.
  pub fn advance_across(
    &mut self,
    now: BlockNumber,
    opening_supply: Balance,
    closing_supply: Balance,
    max_fraction: Perbill,
    window_steps: u32,
  ) -> Result<(), BatteryError> {
    let charge = self.replenished(now, max_fraction, window_steps)?;
    let redeemed = self
      .last_supply
      .saturating_sub(opening_supply)
      .saturating_add(opening_supply.saturating_sub(closing_supply));
    let charge = charge
      .checked_sub(redeemed)
      .ok_or(BatteryError::InsufficientCharge)?;
    self.last_step = now;
    self.last_supply = closing_supply;
    self.charge = charge.min(max_fraction.mul_floor(closing_supply));
    Ok(())
  }
}
