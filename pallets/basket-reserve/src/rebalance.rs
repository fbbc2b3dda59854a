//! Rebalance engine.
//!
//! Moves collateral toward its targets at a rate bounded by the blocks elapsed since the last
//! rebalance. Which trade runs depends on whether the basket has a deficit, a surplus, or both.

use crate::{
  AssetKind, Basket, Config, ConfigOf, Error, Event, Exchange, InsurancePool, LOG_TARGET,
  LastRebalanceStep, Pallet, TradingFrozenBy,
  types::{Balance, RebalanceBranch},
};
use frame::{
  deps::sp_runtime::{
    PerThing,
    traits::{SaturatedConversion, Saturating, Zero},
  },
  prelude::*,
};

impl<T: Config> Pallet<T> {
  pub(crate) fn rebalance(config: &ConfigOf<T>) -> Result<RebalanceBranch, DispatchError> {
    let now = frame_system::Pallet::<T>::block_number();
    let elapsed: u128 = now
      .saturating_sub(LastRebalanceStep::<T>::get())
      .saturated_into();
    LastRebalanceStep::<T>::put(now);

    if elapsed.is_zero() || TradingFrozenBy::<T>::exists() {
      return Ok(RebalanceBranch::Idle);
    }

    let basket = Basket::<T>::get();
    let accountant = Self::accountant(&basket)?;
    let account = Self::account_id();

    let branch = match (
      accountant.least_collateralized(),
      accountant.most_collateralized(),
    ) {
      (Some(least), Some(most)) => {
        let amount = elapsed
          .saturating_mul(basket[most].rate_limit)
          .min(accountant.tradeable_surplus(most));
        Self::execute_trade(
          config,
          RebalanceBranch::Swap,
          basket[most].asset,
          basket[least].asset,
          amount,
        )?;
        RebalanceBranch::Swap
      }
      (Some(least), None) => {
        let requested = elapsed.saturating_mul(config.backstop_sell_rate);
        if !requested.is_zero() {
          let seized = T::InsurancePool::seize_reserve(&account, requested)?;
          Self::deposit_event(Event::BackstopSeized { requested, seized });
          Self::execute_trade(
            config,
            RebalanceBranch::Backstop,
            config.backstop_asset,
            basket[least].asset,
            seized,
          )?;
        }
        RebalanceBranch::Backstop
      }
      (None, Some(most)) => {
        let amount = elapsed
          .saturating_mul(basket[most].rate_limit)
          .min(accountant.tradeable_surplus(most));
        let bought = Self::execute_trade(
          config,
          RebalanceBranch::Accumulate,
          basket[most].asset,
          config.backstop_asset,
          amount,
        )?;
        if !bought.is_zero() {
          Self::transfer_asset(config.backstop_asset, &account, &config.insurance_pool, bought)?;
        }
        RebalanceBranch::Accumulate
      }
      (None, None) => RebalanceBranch::Idle,
    };

    log::debug!(target: LOG_TARGET, "rebalance over {} blocks: {:?}", elapsed, branch);
    Ok(branch)
  }

  /// Sell through the exchange and return what the pallet account actually received.
  fn execute_trade(
    config: &ConfigOf<T>,
    branch: RebalanceBranch,
    sell: AssetKind,
    buy: AssetKind,
    amount: Balance,
  ) -> Result<Balance, DispatchError> {
    if amount.is_zero() {
      return Ok(0);
    }

    let min_buy = match config.slippage_tolerance {
      Some(tolerance) => {
        let quote = T::Exchange::quote(sell, buy, amount).ok_or(Error::<T>::QuoteUnavailable)?;
        quote.saturating_sub(tolerance.mul_floor(quote))
      }
      None => 0,
    };

    let account = Self::account_id();
    let before = Self::balance_of(buy, &account);
    T::Exchange::trade(&account, sell, buy, amount, min_buy)?;
    let bought = Self::balance_of(buy, &account).saturating_sub(before);
    ensure!(bought >= min_buy, Error::<T>::SlippageExceeded);

    Self::deposit_event(Event::Rebalanced {
      branch,
      sell_asset: sell,
      buy_asset: buy,
      sold: amount,
      bought,
    });
    Ok(bought)
  }
}
