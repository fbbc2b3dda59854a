extern crate alloc;

use crate::*;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_support::traits::fungibles::Mutate as _;
use polkadot_sdk::frame_system::RawOrigin;

const UNITS: Balance = 1_000_000_000_000_000;

fn fund_basket<T: Config>(who: &T::AccountId, amount: Balance) {
  for entry in T::Configuration::current().basket {
    T::BenchmarkHelper::fund(who, entry.asset, amount).expect("Failed to fund collateral");
  }
}

fn mint_reserve<T: Config>(who: &T::AccountId, amount: Balance) {
  T::Assets::mint_into(T::ReserveTokenId::get(), who, amount).expect("Failed to mint reserve");
}

fn queue_mints<T: Config>(n: u32) {
  let recipient: T::AccountId = account("recipient", 0, 0);
  for _ in 0..n {
    Pallet::<T>::enqueue_mint(recipient.clone(), 1_000).expect("Failed to enqueue");
  }
}

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn issue() {
    let caller: T::AccountId = whitelisted_caller();
    fund_basket::<T>(&caller, UNITS);

    #[extrinsic_call]
    issue(RawOrigin::Signed(caller), UNITS / 2);

    assert_eq!(QueueTail::<T>::get(), 1);
  }

  #[benchmark]
  fn redeem() {
    let caller: T::AccountId = whitelisted_caller();
    fund_basket::<T>(&Pallet::<T>::account_id(), UNITS);
    mint_reserve::<T>(&caller, UNITS);
    let amount = UNITS / 1_000;
    Battery::<T>::put(BatteryState {
      last_step: polkadot_sdk::frame_system::Pallet::<T>::block_number(),
      last_supply: Pallet::<T>::total_supply(),
      charge: amount,
    });

    #[extrinsic_call]
    redeem(RawOrigin::Signed(caller), amount);
  }

  #[benchmark]
  fn transfer() {
    let caller: T::AccountId = whitelisted_caller();
    let dest: T::AccountId = account("dest", 0, 0);
    mint_reserve::<T>(&caller, UNITS);

    #[extrinsic_call]
    transfer(RawOrigin::Signed(caller), dest, UNITS / 1_000);
  }

  #[benchmark]
  fn freeze_trading() {
    let caller: T::AccountId = whitelisted_caller();

    #[extrinsic_call]
    freeze_trading(RawOrigin::Signed(caller.clone()));

    assert_eq!(TradingFrozenBy::<T>::get(), Some(caller));
  }

  #[benchmark]
  fn unfreeze_trading() {
    let caller: T::AccountId = whitelisted_caller();
    TradingFrozenBy::<T>::put(&caller);

    #[extrinsic_call]
    unfreeze_trading(RawOrigin::Signed(caller));

    assert!(!TradingFrozenBy::<T>::exists());
  }

  #[benchmark]
  fn force_unfreeze_trading() {
    let freezer: T::AccountId = account("freezer", 0, 0);
    TradingFrozenBy::<T>::put(&freezer);

    #[extrinsic_call]
    force_unfreeze_trading(RawOrigin::Root);

    assert!(!TradingFrozenBy::<T>::exists());
  }

  #[benchmark]
  fn tick() {
    let caller: T::AccountId = whitelisted_caller();

    #[extrinsic_call]
    tick(RawOrigin::Signed(caller));
  }

  #[benchmark]
  fn process_issuance(n: Linear<1, 32>) {
    let caller: T::AccountId = whitelisted_caller();
    queue_mints::<T>(n);

    #[extrinsic_call]
    process_issuance(RawOrigin::Signed(caller), n);
  }

  #[benchmark]
  fn force_process_issuance(n: Linear<1, 32>) {
    queue_mints::<T>(n);

    #[extrinsic_call]
    force_process_issuance(RawOrigin::Root, n);

    assert_eq!(QueueHead::<T>::get(), QueueTail::<T>::get());
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
