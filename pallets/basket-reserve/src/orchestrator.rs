//! Step sequencing shared by every external action.
//!
//! One configuration snapshot drives the whole step:
//! drain the issuance queue, refresh the basket, expand supply, rebalance,
//! run the action body, then advance the battery exactly once.
//! Mints made by the step never offset contraction made by the body.

use crate::{
  AssetKind, Basket, Battery, Config, ConfigOf, Error, Event, LOG_TARGET, Pallet,
  ProvideConfiguration,
  types::{Balance, DrainMode, DrainOutcome},
};
use frame::{deps::sp_runtime::traits::Zero, prelude::*};

/// Authority to credit newly minted reserve tokens.
///
/// Only the step orchestrator can construct one, so reserve tokens are minted by queue
/// settlement and supply expansion and nowhere else.
pub struct MintPermit {
  _sealed: (),
}

impl MintPermit {
  fn new() -> Self {
    Self { _sealed: () }
  }
}

impl<T: Config> Pallet<T> {
  /// Run a full step around `body`; any error reverts the step and the body together.
  pub(crate) fn act<R>(
    drain_limit: u32,
    body: impl FnOnce(&ConfigOf<T>, &MintPermit) -> Result<R, DispatchError>,
  ) -> Result<R, DispatchError> {
    let (config, permit) = Self::step(drain_limit)?;
    let opening_supply = Self::total_supply();
    let output = body(&config, &permit)?;
    Self::advance_battery(&config, opening_supply)?;
    Ok(output)
  }

  fn step(drain_limit: u32) -> Result<(ConfigOf<T>, MintPermit), DispatchError> {
    let config = T::Configuration::current();
    Self::validate_configuration(&config)?;
    let permit = MintPermit::new();

    match Self::drain_issuance(&permit, &config, drain_limit, DrainMode::Budgeted)? {
      DrainOutcome::Halted => {
        log::warn!(target: LOG_TARGET, "circuit breaker tripped, issuance deferred");
      }
      DrainOutcome::Progress {
        settled, minted, ..
      } if settled > 0 => {
        log::debug!(target: LOG_TARGET, "settled {} queued mints ({})", settled, minted);
      }
      DrainOutcome::Progress { .. } => {}
    }

    Self::refresh_basket(&config)?;
    Self::expand_supply(&permit, &config)?;
    Self::rebalance(&config)?;
    Ok((config, permit))
  }

  fn validate_configuration(config: &ConfigOf<T>) -> DispatchResult {
    ensure!(config.window_steps > 0, Error::<T>::InvalidConfiguration);

    let reserve = AssetKind::Local(T::ReserveTokenId::get());
    ensure!(
      config.backstop_asset != reserve,
      Error::<T>::InvalidConfiguration
    );
    for (i, entry) in config.basket.iter().enumerate() {
      ensure!(!entry.quantity.is_zero(), Error::<T>::InvalidBasket);
      ensure!(
        entry.asset != reserve && entry.asset != config.backstop_asset,
        Error::<T>::InvalidBasket
      );
      ensure!(
        config.basket[..i].iter().all(|seen| seen.asset != entry.asset),
        Error::<T>::InvalidBasket
      );
    }
    Ok(())
  }

  fn refresh_basket(config: &ConfigOf<T>) -> DispatchResult {
    let basket = BoundedVec::<_, T::MaxBasketSize>::try_from(config.basket.clone())
      .map_err(|_| Error::<T>::BasketTooLarge)?;
    if Basket::<T>::get() != basket {
      let assets = basket.len() as u32;
      Basket::<T>::put(basket);
      Self::deposit_event(Event::BasketUpdated { assets });
    }
    Ok(())
  }

  fn advance_battery(config: &ConfigOf<T>, opening_supply: Balance) -> DispatchResult {
    let now = frame_system::Pallet::<T>::block_number();
    let closing_supply = Self::total_supply();
    Battery::<T>::try_mutate(|battery| {
      battery
        .advance_across(
          now,
          opening_supply,
          closing_supply,
          config.max_redemption_fraction,
          config.window_steps,
        )
        .map_err(|error| Error::<T>::from(error).into())
    })
  }
}
