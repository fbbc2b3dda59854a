//! Supply expansion and treasury sweep.

use crate::{
  Config, ConfigOf, Event, InsurancePool, LOG_TARGET, LastExpansion, MintPermit, Pallet, math,
  types::Balance,
};
use frame::{
  deps::{
    frame_support::traits::{Time, fungibles::Mutate, tokens::Preservation},
    sp_runtime::{
      PerThing, Perbill,
      traits::{SaturatedConversion, Saturating, Zero},
    },
  },
  prelude::*,
};

/// Milliseconds in a Julian year
pub const MILLIS_PER_YEAR: u64 = (365 * 24 + 6) * 60 * 60 * 1000;

impl<T: Config> Pallet<T> {
  /// Mint `supply × rate × elapsed / year`, split between the protocol fund and the treasury
  /// buffer, then sweep the buffer if it outgrew the revenue batch.
  pub(crate) fn expand_supply(permit: &MintPermit, config: &ConfigOf<T>) -> DispatchResult {
    let now = T::TimeProvider::now();
    let Some(last) = LastExpansion::<T>::get() else {
      LastExpansion::<T>::put(now);
      return Ok(());
    };
    LastExpansion::<T>::put(now);

    let elapsed: u128 = now.saturating_sub(last).saturated_into();
    let to_expand = Self::expansion_amount(config.supply_expansion_rate, elapsed)?;
    if !to_expand.is_zero() {
      let protocol_share = config.expenditure_fraction.mul_floor(to_expand);
      let treasury_share = to_expand - protocol_share;
      if !protocol_share.is_zero() {
        Self::credit_mint(permit, &config.protocol_fund, protocol_share)?;
      }
      if !treasury_share.is_zero() {
        Self::credit_mint(permit, &Self::account_id(), treasury_share)?;
      }
      log::debug!(
        target: LOG_TARGET,
        "expanded supply by {} over {} ms",
        to_expand,
        elapsed
      );
      Self::deposit_event(Event::SupplyExpanded {
        protocol_share,
        treasury_share,
      });
    }

    Self::sweep_treasury(config)
  }

  fn expansion_amount(rate: Perbill, elapsed_ms: u128) -> Result<Balance, DispatchError> {
    if rate.is_zero() || elapsed_ms.is_zero() {
      return Ok(0);
    }
    let numerator = (rate.deconstruct() as u128)
      .checked_mul(elapsed_ms)
      .ok_or(crate::Error::<T>::ArithmeticOverflow)?;
    let denominator = (Perbill::one().deconstruct() as u128) * (MILLIS_PER_YEAR as u128);
    math::mul_div_floor(Self::total_supply(), numerator, denominator)
      .ok_or_else(|| crate::Error::<T>::ArithmeticOverflow.into())
  }

  /// Pay the whole buffer to the insurance pool once it exceeds `revenue_batch × supply`.
  fn sweep_treasury(config: &ConfigOf<T>) -> DispatchResult {
    let buffer = Self::treasury_buffer();
    let threshold = config.revenue_batch_fraction.mul_floor(Self::total_supply());
    if buffer.is_zero() || buffer <= threshold {
      return Ok(());
    }

    T::Assets::transfer(
      T::ReserveTokenId::get(),
      &Self::account_id(),
      &config.insurance_pool,
      buffer,
      Preservation::Expendable,
    )?;
    T::InsurancePool::notify_revenue(buffer)?;

    log::debug!(target: LOG_TARGET, "swept {} to the insurance pool", buffer);
    Self::deposit_event(Event::RevenueSwept { amount: buffer });
    Ok(())
  }
}
