//! Basket Reserve Pallet
//!
//! Accounting and rebalancing engine of a basket-backed, elastic-supply reserve token.
//!
//! Every state-changing action runs one orchestrated step before its own body:
//! queued mints are settled against a per-block issuance budget, the backing basket snapshot
//! is refreshed, supply expansion is minted, and collateral is moved toward its targets through
//! an external exchange. The body is followed by a single advance of the redemption battery,
//! which rejects the whole action when supply shrank faster than the battery allows.
//!
//! The reserve token itself is a `pallet-assets` asset (`ReserveTokenId`). Collateral and the
//! treasury buffer are held by the pallet account.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod basket;
pub mod battery;
mod expansion;
mod issuance;
pub mod math;
mod orchestrator;
mod rebalance;
pub mod traits;
pub mod types;

pub use expansion::MILLIS_PER_YEAR;
pub use orchestrator::MintPermit;
pub use primitives::AssetKind;
pub use traits::{CalculateFee, CircuitBreaker, Exchange, InsurancePool, ProvideConfiguration};
pub use types::{
  BatteryState, CollateralEntry, DrainMode, DrainOutcome, PendingMint, QueueIndex,
  RebalanceBranch, ReserveConfig,
};

#[cfg(test)]
pub mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod weights;
pub use weights::WeightInfo;

use alloc::vec::Vec;
use frame::prelude::*;

use frame::deps::{
  frame_support::traits::{
    Time,
    fungible::{Inspect as NativeInspect, Mutate as NativeMutate},
    fungibles::{Inspect, Mutate},
    tokens::{Fortitude, Precision, Preservation},
  },
  sp_runtime::{
    PerThing,
    traits::{AccountIdConversion, Zero},
  },
};

pub(crate) const LOG_TARGET: &str = "runtime::basket-reserve";

/// Funds benchmark accounts with basket collateral
#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId> {
  fn fund(who: &AccountId, asset: AssetKind, amount: types::Balance) -> DispatchResult;
}

#[frame::pallet]
pub mod pallet {
  use super::*;
  use crate::math::Rounding;
  pub use crate::types::Balance;

  pub type MomentOf<T> = <<T as Config>::TimeProvider as Time>::Moment;
  pub type ConfigOf<T> = ReserveConfig<<T as frame_system::Config>::AccountId>;

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Reserve token and collateral held in pallet-assets
    type Assets: Inspect<Self::AccountId, AssetId = u32, Balance = Balance>
      + Mutate<Self::AccountId, AssetId = u32, Balance = Balance>;

    /// Native collateral
    type Currency: NativeMutate<Self::AccountId, Balance = Balance>
      + NativeInspect<Self::AccountId, Balance = Balance>;

    /// Wall clock for supply expansion
    type TimeProvider: Time;

    /// Derives the account that holds collateral and the treasury buffer
    #[pallet::constant]
    type PalletId: Get<frame::deps::frame_support::PalletId>;

    /// pallet-assets id of the reserve token
    #[pallet::constant]
    type ReserveTokenId: Get<u32>;

    /// Fixed-point scale of basket quantities
    #[pallet::constant]
    type Precision: Get<Balance>;

    #[pallet::constant]
    type MaxBasketSize: Get<u32>;

    /// Queued mints settled by one orchestrated step
    #[pallet::constant]
    type MaxDrainPerStep: Get<u32>;

    type Configuration: ProvideConfiguration<Self::AccountId>;

    type CircuitBreaker: CircuitBreaker;

    type Exchange: Exchange<Self::AccountId>;

    type InsurancePool: InsurancePool<Self::AccountId>;

    type FeeCalculator: CalculateFee<Self::AccountId>;

    /// Origin for forced drains and forced unfreezes
    type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// Origin allowed to freeze trading; the resolved account is the only one able to unfreeze
    type FreezeOrigin: EnsureOrigin<Self::RuntimeOrigin, Success = Self::AccountId>;

    type WeightInfo: WeightInfo;

    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<Self::AccountId>;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(_);

  /// Basket snapshot taken by the last step
  #[pallet::storage]
  pub type Basket<T: Config> =
    StorageValue<_, BoundedVec<CollateralEntry, T::MaxBasketSize>, ValueQuery>;

  /// Issuance queue, `QueueHead..QueueTail`
  #[pallet::storage]
  pub type PendingMints<T: Config> =
    StorageMap<_, Twox64Concat, QueueIndex, PendingMint<T::AccountId>, OptionQuery>;

  #[pallet::storage]
  pub type QueueHead<T: Config> = StorageValue<_, QueueIndex, ValueQuery>;

  #[pallet::storage]
  pub type QueueTail<T: Config> = StorageValue<_, QueueIndex, ValueQuery>;

  /// Sum of all queued amounts, already backed by deposited collateral
  #[pallet::storage]
  pub type PendingIssuance<T: Config> = StorageValue<_, Balance, ValueQuery>;

  /// Issuance clock; lags behind the current block by banked budget
  #[pallet::storage]
  pub type LastDrainStep<T: Config> = StorageValue<_, BlockNumberFor<T>, ValueQuery>;

  #[pallet::storage]
  pub type LastRebalanceStep<T: Config> = StorageValue<_, BlockNumberFor<T>, ValueQuery>;

  /// `None` until the first step observes the clock
  #[pallet::storage]
  pub type LastExpansion<T: Config> = StorageValue<_, MomentOf<T>, OptionQuery>;

  #[pallet::storage]
  pub type Battery<T: Config> = StorageValue<_, BatteryState<BlockNumberFor<T>>, ValueQuery>;

  /// Account that froze rebalance trading
  #[pallet::storage]
  pub type TradingFrozenBy<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    /// Start with a full battery instead of an empty one
    pub battery_starts_full: bool,
    #[serde(skip)]
    pub _marker: PhantomData<T>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());
      let now = frame_system::Pallet::<T>::block_number();
      let config = T::Configuration::current();
      Battery::<T>::put(BatteryState::new(
        now,
        Pallet::<T>::total_supply(),
        config.max_redemption_fraction,
        self.battery_starts_full,
      ));
      LastDrainStep::<T>::put(now);
      LastRebalanceStep::<T>::put(now);
    }
  }

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// Collateral deposited and a mint queued
    IssuanceQueued {
      recipient: T::AccountId,
      index: QueueIndex,
      amount: Balance,
    },
    /// Queued mint credited
    IssuanceSettled {
      recipient: T::AccountId,
      index: QueueIndex,
      amount: Balance,
    },
    /// Queue head exceeds the remaining issuance budget
    IssuanceBlocked {
      index: QueueIndex,
      amount: Balance,
      available: Balance,
    },
    /// Administrative drain ignoring the budget
    IssuanceForced { settled: u32, minted: Balance },
    /// Reserve tokens burned and collateral paid out
    Redeemed { who: T::AccountId, amount: Balance },
    /// Reserve tokens moved with a capped fee
    Transferred {
      from: T::AccountId,
      to: T::AccountId,
      amount: Balance,
      fee: Balance,
    },
    /// New basket snapshot picked up from configuration
    BasketUpdated { assets: u32 },
    /// Collateral traded through the exchange
    Rebalanced {
      branch: RebalanceBranch,
      sell_asset: AssetKind,
      buy_asset: AssetKind,
      sold: Balance,
      bought: Balance,
    },
    /// Backstop asset taken from the insurance pool
    BackstopSeized { requested: Balance, seized: Balance },
    /// Supply expansion minted
    SupplyExpanded {
      protocol_share: Balance,
      treasury_share: Balance,
    },
    /// Treasury buffer paid to the insurance pool
    RevenueSwept { amount: Balance },
    TradingFrozen { by: T::AccountId },
    TradingUnfrozen { by: T::AccountId },
    /// Freeze lifted by `AdminOrigin`
    TradingForceUnfrozen,
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Zero amount not allowed
    ZeroAmount,
    /// No basket configured
    EmptyBasket,
    /// Basket entry with zero quantity, duplicate asset, or the reserve or backstop asset
    InvalidBasket,
    /// Basket exceeds `MaxBasketSize`
    BasketTooLarge,
    /// Configuration snapshot cannot drive a step
    InvalidConfiguration,
    /// Redemption exceeds the battery charge
    InsufficientCharge,
    /// Caller did not freeze trading
    NotFreezer,
    AlreadyFrozen,
    NotFrozen,
    /// Circuit breaker tripped
    CircuitBreakerTripped,
    /// Arithmetic overflow occurred
    ArithmeticOverflow,
    /// Trade filled below the tolerated quote
    SlippageExceeded,
    /// Exchange could not price the trade
    QuoteUnavailable,
    /// Queue index inside the live range has no entry
    QueueEntryMissing,
  }

  #[pallet::hooks]
  impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
    fn integrity_test() {
      assert!(
        T::MaxDrainPerStep::get() > 0,
        "MaxDrainPerStep must be non-zero"
      );
      assert!(!T::Precision::get().is_zero(), "Precision must be non-zero");
    }

    #[cfg(feature = "try-runtime")]
    fn try_state(_n: BlockNumberFor<T>) -> Result<(), frame::deps::sp_runtime::TryRuntimeError> {
      Self::do_try_state()
    }
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Deposit basket collateral for `amount` reserve tokens, minted through the queue
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::issue())]
    pub fn issue(origin: OriginFor<T>, amount: Balance) -> DispatchResult {
      let who = ensure_signed(origin)?;
      ensure!(!amount.is_zero(), Error::<T>::ZeroAmount);

      Self::act(T::MaxDrainPerStep::get(), |_, _| {
        let basket = Basket::<T>::get();
        ensure!(!basket.is_empty(), Error::<T>::EmptyBasket);

        let account = Self::account_id();
        for (asset, due) in Self::collateral_amounts(&basket, amount, Rounding::Up)? {
          if !due.is_zero() {
            Self::transfer_asset(asset, &who, &account, due)?;
          }
        }
        Self::enqueue_mint(who.clone(), amount)?;
        Ok(())
      })
    }

    /// Burn `amount` reserve tokens for their share of every basket asset
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::redeem())]
    pub fn redeem(origin: OriginFor<T>, amount: Balance) -> DispatchResult {
      let who = ensure_signed(origin)?;
      ensure!(!amount.is_zero(), Error::<T>::ZeroAmount);

      Self::act(T::MaxDrainPerStep::get(), |_, _| {
        let basket = Basket::<T>::get();
        ensure!(!basket.is_empty(), Error::<T>::EmptyBasket);

        T::Assets::burn_from(
          T::ReserveTokenId::get(),
          &who,
          amount,
          Preservation::Expendable,
          Precision::Exact,
          Fortitude::Polite,
        )?;

        let account = Self::account_id();
        for (asset, due) in Self::collateral_amounts(&basket, amount, Rounding::Down)? {
          if !due.is_zero() {
            Self::transfer_asset(asset, &account, &who, due)?;
          }
        }

        Self::deposit_event(Event::Redeemed { who: who.clone(), amount });
        Ok(())
      })
    }

    /// Transfer reserve tokens; the fee goes to the treasury buffer
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::transfer())]
    pub fn transfer(origin: OriginFor<T>, dest: T::AccountId, amount: Balance) -> DispatchResult {
      let who = ensure_signed(origin)?;
      ensure!(!amount.is_zero(), Error::<T>::ZeroAmount);

      Self::act(T::MaxDrainPerStep::get(), |config, _| {
        let fee = T::FeeCalculator::calculate_fee(&who, &dest, amount)
          .min(config.max_fee.mul_floor(amount));
        // `max_fee` is at most 100%, so `fee <= amount`.
        let net = amount.saturating_sub(fee);
        let token = T::ReserveTokenId::get();

        if !net.is_zero() {
          T::Assets::transfer(token, &who, &dest, net, Preservation::Expendable)?;
        }
        if !fee.is_zero() {
          T::Assets::transfer(
            token,
            &who,
            &Self::account_id(),
            fee,
            Preservation::Expendable,
          )?;
        }

        Self::deposit_event(Event::Transferred {
          from: who.clone(),
          to: dest.clone(),
          amount,
          fee,
        });
        Ok(())
      })
    }

    /// Stop rebalance trades until the same account unfreezes
    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::freeze_trading())]
    pub fn freeze_trading(origin: OriginFor<T>) -> DispatchResult {
      let who = T::FreezeOrigin::ensure_origin(origin)?;

      Self::act(T::MaxDrainPerStep::get(), |_, _| {
        ensure!(
          !TradingFrozenBy::<T>::exists(),
          Error::<T>::AlreadyFrozen
        );
        TradingFrozenBy::<T>::put(&who);
        Self::deposit_event(Event::TradingFrozen { by: who.clone() });
        Ok(())
      })
    }

    #[pallet::call_index(4)]
    #[pallet::weight(T::WeightInfo::unfreeze_trading())]
    pub fn unfreeze_trading(origin: OriginFor<T>) -> DispatchResult {
      let who = T::FreezeOrigin::ensure_origin(origin)?;

      Self::act(T::MaxDrainPerStep::get(), |_, _| {
        let freezer = TradingFrozenBy::<T>::get().ok_or(Error::<T>::NotFrozen)?;
        ensure!(freezer == who, Error::<T>::NotFreezer);
        TradingFrozenBy::<T>::kill();
        Self::deposit_event(Event::TradingUnfrozen { by: who.clone() });
        Ok(())
      })
    }

    #[pallet::call_index(5)]
    #[pallet::weight(T::WeightInfo::force_unfreeze_trading())]
    pub fn force_unfreeze_trading(origin: OriginFor<T>) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;

      Self::act(T::MaxDrainPerStep::get(), |_, _| {
        ensure!(TradingFrozenBy::<T>::exists(), Error::<T>::NotFrozen);
        TradingFrozenBy::<T>::kill();
        log::info!(target: LOG_TARGET, "trading unfrozen by admin");
        Self::deposit_event(Event::TradingForceUnfrozen);
        Ok(())
      })
    }

    /// Run one step with no action body
    #[pallet::call_index(6)]
    #[pallet::weight(T::WeightInfo::tick())]
    pub fn tick(origin: OriginFor<T>) -> DispatchResult {
      ensure_signed(origin)?;
      Self::act(T::MaxDrainPerStep::get(), |_, _| Ok(()))
    }

    /// Run one step settling at most `max_entries` queued mints, failing while halted
    #[pallet::call_index(7)]
    #[pallet::weight(T::WeightInfo::process_issuance(*max_entries))]
    pub fn process_issuance(origin: OriginFor<T>, max_entries: u32) -> DispatchResult {
      ensure_signed(origin)?;
      ensure!(
        !T::CircuitBreaker::is_tripped(),
        Error::<T>::CircuitBreakerTripped
      );
      Self::act(max_entries.min(T::MaxDrainPerStep::get()), |_, _| Ok(()))
    }

    /// Settle up to `max_entries` queued mints regardless of the issuance budget.
    ///
    /// Budget banked while the head was blocked is forfeited: entries left behind wait for
    /// blocks elapsed after this call.
    #[pallet::call_index(8)]
    #[pallet::weight(T::WeightInfo::force_process_issuance(*max_entries))]
    pub fn force_process_issuance(origin: OriginFor<T>, max_entries: u32) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;

      Self::act(T::MaxDrainPerStep::get(), |config, permit| {
        let limit = max_entries.min(T::MaxDrainPerStep::get());
        match Self::drain_issuance(permit, config, limit, DrainMode::Forced)? {
          DrainOutcome::Halted => Err(Error::<T>::CircuitBreakerTripped.into()),
          DrainOutcome::Progress { settled, minted, .. } => {
            log::info!(
              target: LOG_TARGET,
              "forced drain settled {} entries, minted {}",
              settled,
              minted
            );
            Self::deposit_event(Event::IssuanceForced { settled, minted });
            Ok(())
          }
        }
      })
    }
  }

  impl<T: Config> Pallet<T> {
    /// Account holding collateral and the treasury buffer
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    /// Reserve tokens in existence, treasury buffer included
    pub fn total_supply() -> Balance {
      T::Assets::total_issuance(T::ReserveTokenId::get())
    }

    pub fn treasury_buffer() -> Balance {
      T::Assets::balance(T::ReserveTokenId::get(), &Self::account_id())
    }

    /// Supply the basket must back: minted tokens plus queued mints
    pub fn backed_supply() -> Balance {
      Self::total_supply().saturating_add(PendingIssuance::<T>::get())
    }

    /// Queued mints in settlement order
    pub fn queued_mints() -> Vec<(QueueIndex, PendingMint<T::AccountId>)> {
      (QueueHead::<T>::get()..QueueTail::<T>::get())
        .filter_map(|index| PendingMints::<T>::get(index).map(|entry| (index, entry)))
        .collect()
    }

    /// Collateral `issue(amount)` would pull from the caller, per the stored basket
    pub fn issuance_quote(amount: Balance) -> Result<Vec<(AssetKind, Balance)>, DispatchError> {
      Self::collateral_amounts(&Basket::<T>::get(), amount, Rounding::Up)
    }

    /// Collateral `redeem(amount)` would pay out, per the stored basket
    pub fn redemption_quote(amount: Balance) -> Result<Vec<(AssetKind, Balance)>, DispatchError> {
      Self::collateral_amounts(&Basket::<T>::get(), amount, Rounding::Down)
    }

    /// Basket index furthest below target, read from live balances
    pub fn least_collateralized() -> Result<Option<u32>, DispatchError> {
      let basket = Basket::<T>::get();
      let accountant = Self::accountant(&basket)?;
      Ok(accountant.least_collateralized().map(|i| i as u32))
    }

    /// Basket index furthest above target plus rate limit, read from live balances
    pub fn most_collateralized() -> Result<Option<u32>, DispatchError> {
      let basket = Basket::<T>::get();
      let accountant = Self::accountant(&basket)?;
      Ok(accountant.most_collateralized().map(|i| i as u32))
    }

    pub fn is_fully_collateralized() -> Result<bool, DispatchError> {
      let basket = Basket::<T>::get();
      let accountant = Self::accountant(&basket)?;
      Ok(accountant.is_fully_collateralized())
    }

    /// Redemption the battery would allow at the current block
    pub fn available_charge() -> Result<Balance, DispatchError> {
      let config = T::Configuration::current();
      Battery::<T>::get()
        .replenished(
          frame_system::Pallet::<T>::block_number(),
          config.max_redemption_fraction,
          config.window_steps,
        )
        .map_err(|error| Error::<T>::from(error).into())
    }

    pub(crate) fn accountant(
      basket: &[CollateralEntry],
    ) -> Result<crate::basket::BasketAccountant<'_>, DispatchError> {
      let account = Self::account_id();
      let balances = basket
        .iter()
        .map(|entry| Self::balance_of(entry.asset, &account))
        .collect();
      crate::basket::BasketAccountant::new(
        basket,
        Self::backed_supply(),
        T::Precision::get(),
        balances,
      )
        .map_err(|_| Error::<T>::ArithmeticOverflow.into())
    }

    pub(crate) fn collateral_amounts(
      basket: &[CollateralEntry],
      amount: Balance,
      rounding: Rounding,
    ) -> Result<Vec<(AssetKind, Balance)>, DispatchError> {
      let precision = T::Precision::get();
      basket
        .iter()
        .map(|entry| -> Result<(AssetKind, Balance), DispatchError> {
          let due = math::mul_div(amount, entry.quantity, precision, rounding)
            .ok_or(Error::<T>::ArithmeticOverflow)?;
          Ok((entry.asset, due))
        })
        .collect()
    }

    pub(crate) fn balance_of(asset: AssetKind, who: &T::AccountId) -> Balance {
      match asset.asset_id() {
        None => T::Currency::balance(who),
        Some(id) => T::Assets::balance(id, who),
      }
    }

    pub(crate) fn transfer_asset(
      asset: AssetKind,
      from: &T::AccountId,
      to: &T::AccountId,
      amount: Balance,
    ) -> DispatchResult {
      match asset.asset_id() {
        None => {
          T::Currency::transfer(from, to, amount, Preservation::Expendable)?;
        }
        Some(id) => {
          T::Assets::transfer(id, from, to, amount, Preservation::Expendable)?;
        }
      }
      Ok(())
    }

    #[cfg(any(test, feature = "try-runtime"))]
    pub fn do_try_state() -> Result<(), frame::deps::sp_runtime::TryRuntimeError> {
      let head = QueueHead::<T>::get();
      let tail = QueueTail::<T>::get();
      ensure!(head <= tail, "queue head past tail");

      let mut queued: Balance = 0;
      let mut entries: u64 = 0;
      for (index, entry) in PendingMints::<T>::iter() {
        ensure!(index >= head && index < tail, "queue entry outside live range");
        ensure!(!entry.amount.is_zero(), "zero amount queued");
        queued = queued.saturating_add(entry.amount);
        entries += 1;
      }
      ensure!(entries == tail - head, "queue has gaps");
      ensure!(
        queued == PendingIssuance::<T>::get(),
        "pending issuance out of sync with queue"
      );

      let config = T::Configuration::current();
      let battery = Battery::<T>::get();
      ensure!(
        battery.charge <= battery.capacity(config.max_redemption_fraction),
        "battery charge above capacity"
      );
      Ok(())
    }
  }
}
