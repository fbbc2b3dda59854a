//! Contracts of the collaborators the engine drives.
//!
//! Configuration storage, the exchange, the insurance pool, fee policy and the circuit breaker
//! all live outside this pallet; the runtime wires concrete implementations through `Config`.

use crate::types::{Balance, ReserveConfig};
use frame::prelude::*;
use primitives::AssetKind;

/// Source of the dynamic configuration snapshot.
pub trait ProvideConfiguration<AccountId> {
  fn current() -> ReserveConfig<AccountId>;
}

/// Global emergency switch. While tripped, queued mints stay queued.
pub trait CircuitBreaker {
  fn is_tripped() -> bool;
}

impl CircuitBreaker for () {
  fn is_tripped() -> bool {
    false
  }
}

/// Market the rebalance engine trades against.
pub trait Exchange<AccountId> {
  /// Sell `sell_amount` of `sell` from `who` for at least `min_buy` of `buy`.
  ///
  /// The engine measures what it actually received, so implementations may treat `min_buy` as
  /// advisory.
  fn trade(
    who: &AccountId,
    sell: AssetKind,
    buy: AssetKind,
    sell_amount: Balance,
    min_buy: Balance,
  ) -> DispatchResult;

  /// Expected proceeds of selling `sell_amount`, `None` if the pair cannot be priced.
  fn quote(sell: AssetKind, buy: AssetKind, sell_amount: Balance) -> Option<Balance>;
}

/// Holder of the backstop asset and recipient of protocol revenue.
pub trait InsurancePool<AccountId> {
  /// Transfer up to `amount` of the backstop asset to `beneficiary`, returning what was seized.
  fn seize_reserve(beneficiary: &AccountId, amount: Balance) -> Result<Balance, DispatchError>;

  /// Swept treasury revenue of `amount` reserve tokens has just been paid to the pool account.
  fn notify_revenue(amount: Balance) -> DispatchResult;
}

/// Transfer fee policy. The engine caps the result at `max_fee × amount`.
pub trait CalculateFee<AccountId> {
  fn calculate_fee(from: &AccountId, to: &AccountId, amount: Balance) -> Balance;
}

impl<AccountId> CalculateFee<AccountId> for () {
  fn calculate_fee(_from: &AccountId, _to: &AccountId, _amount: Balance) -> Balance {
    0
  }
}
