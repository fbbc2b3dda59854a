#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]
#![allow(missing_docs)]

use core::marker::PhantomData;
use polkadot_sdk::frame_support::{
  traits::Get,
  weights::{constants::RocksDbWeight, Weight},
};

pub trait WeightInfo {
  fn issue() -> Weight;
  fn redeem() -> Weight;
  fn transfer() -> Weight;
  fn freeze_trading() -> Weight;
  fn unfreeze_trading() -> Weight;
  fn force_unfreeze_trading() -> Weight;
  fn tick() -> Weight;
  fn process_issuance(n: u32) -> Weight;
  fn force_process_issuance(n: u32) -> Weight;
}

pub struct SubstrateWeight<T>(PhantomData<T>);

impl<T: polkadot_sdk::frame_system::Config + crate::Config> SubstrateWeight<T> {
  /// Drain, basket refresh, expansion, rebalance and battery advance
  fn step(drained: u32) -> Weight {
    let basket_reads = u64::from(T::MaxBasketSize::get());
    let drained = u64::from(drained);
    Weight::from_parts(40_000_000, 4000)
      .saturating_add(Weight::from_parts(12_000_000, 600).saturating_mul(drained))
      .saturating_add(T::DbWeight::get().reads(basket_reads.saturating_add(14)))
      .saturating_add(T::DbWeight::get().reads(drained.saturating_mul(2)))
      .saturating_add(T::DbWeight::get().writes(14))
      .saturating_add(T::DbWeight::get().writes(drained.saturating_mul(3)))
  }
}

impl<T: polkadot_sdk::frame_system::Config + crate::Config> WeightInfo for SubstrateWeight<T> {
  fn issue() -> Weight {
    let basket = u64::from(T::MaxBasketSize::get());
    Self::step(T::MaxDrainPerStep::get())
      .saturating_add(Weight::from_parts(20_000_000, 1500))
      .saturating_add(T::DbWeight::get().reads(basket.saturating_mul(2).saturating_add(3)))
      .saturating_add(T::DbWeight::get().writes(basket.saturating_mul(2).saturating_add(3)))
  }

  fn redeem() -> Weight {
    let basket = u64::from(T::MaxBasketSize::get());
    Self::step(T::MaxDrainPerStep::get())
      .saturating_add(Weight::from_parts(22_000_000, 1500))
      .saturating_add(T::DbWeight::get().reads(basket.saturating_mul(2).saturating_add(3)))
      .saturating_add(T::DbWeight::get().writes(basket.saturating_mul(2).saturating_add(2)))
  }

  fn transfer() -> Weight {
    Self::step(T::MaxDrainPerStep::get())
      .saturating_add(Weight::from_parts(15_000_000, 1200))
      .saturating_add(T::DbWeight::get().reads(4))
      .saturating_add(T::DbWeight::get().writes(4))
  }

  fn freeze_trading() -> Weight {
    Self::step(T::MaxDrainPerStep::get())
      .saturating_add(Weight::from_parts(6_000_000, 300))
      .saturating_add(T::DbWeight::get().reads(1))
      .saturating_add(T::DbWeight::get().writes(1))
  }

  fn unfreeze_trading() -> Weight {
    Self::step(T::MaxDrainPerStep::get())
      .saturating_add(Weight::from_parts(6_000_000, 300))
      .saturating_add(T::DbWeight::get().reads(1))
      .saturating_add(T::DbWeight::get().writes(1))
  }

  fn force_unfreeze_trading() -> Weight {
    Self::step(T::MaxDrainPerStep::get())
      .saturating_add(Weight::from_parts(6_000_000, 300))
      .saturating_add(T::DbWeight::get().reads(1))
      .saturating_add(T::DbWeight::get().writes(1))
  }

  fn tick() -> Weight {
    Self::step(T::MaxDrainPerStep::get())
  }

  fn process_issuance(n: u32) -> Weight {
    Self::step(n.min(T::MaxDrainPerStep::get()))
  }

  fn force_process_issuance(n: u32) -> Weight {
    let forced = u64::from(n.min(T::MaxDrainPerStep::get()));
    Self::step(T::MaxDrainPerStep::get())
      .saturating_add(Weight::from_parts(12_000_000, 600).saturating_mul(forced))
      .saturating_add(T::DbWeight::get().reads(forced.saturating_mul(2).saturating_add(2)))
      .saturating_add(T::DbWeight::get().writes(forced.saturating_mul(3).saturating_add(2)))
  }
}

impl WeightInfo for () {
  fn issue() -> Weight { Weight::from_parts(180_000_000, 12000) }
  fn redeem() -> Weight { Weight::from_parts(185_000_000, 12000) }
  fn transfer() -> Weight { Weight::from_parts(150_000_000, 10000) }
  fn freeze_trading() -> Weight { Weight::from_parts(130_000_000, 9000) }
  fn unfreeze_trading() -> Weight { Weight::from_parts(130_000_000, 9000) }
  fn force_unfreeze_trading() -> Weight { Weight::from_parts(130_000_000, 9000) }
  fn tick() -> Weight { Weight::from_parts(125_000_000, 9000) }
  fn process_issuance(n: u32) -> Weight {
    Weight::from_parts(40_000_000, 4000)
      .saturating_add(Weight::from_parts(12_000_000, 600).saturating_mul(u64::from(n)))
      .saturating_add(RocksDbWeight::get().reads(14))
      .saturating_add(RocksDbWeight::get().writes(14))
  }
  fn force_process_issuance(n: u32) -> Weight {
    Weight::from_parts(125_000_000, 9000)
      .saturating_add(Weight::from_parts(12_000_000, 600).saturating_mul(u64::from(n)))
  }
}
