extern crate alloc;

use crate as pallet_basket_reserve;
use crate::{
  CalculateFee, CircuitBreaker, CollateralEntry, Exchange, InsurancePool, ProvideConfiguration,
  ReserveConfig,
};
use polkadot_sdk::frame_support::traits::{
  fungible, fungibles,
  tokens::{Fortitude, Precision, Preservation},
};
use polkadot_sdk::frame_support::{
  PalletId, construct_runtime, derive_impl,
  traits::{ConstU32, ConstU64, ConstU128, Get},
};
use polkadot_sdk::frame_system;
use polkadot_sdk::sp_runtime::{
  BuildStorage, DispatchError, DispatchResult, PerThing, Perbill, Permill,
  testing::H256,
  traits::{BlakeTwo256, IdentityLookup},
};
use primitives::{
  AssetKind,
  assets::well_known,
  ecosystem::{
    pallet_ids::BASKET_RESERVE_PALLET_ID,
    params::{
      DEFAULT_EXPENDITURE, DEFAULT_MAX_FEE, DEFAULT_MAX_REDEMPTION, MAX_BASKET_SIZE,
      MAX_DRAIN_PER_STEP, PRECISION,
    },
  },
};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

pub const ALICE: u64 = 1;
pub const BOB: u64 = 2;
pub const CHARLIE: u64 = 3;
pub const PROTOCOL_FUND: u64 = 100;
pub const INSURANCE_POOL: u64 = 200;

pub const RESERVE: u32 = well_known::RESERVE_TOKEN;
pub const BACKSTOP: u32 = well_known::BACKSTOP;
pub const USDC: u32 = 10;
pub const TUSD: u32 = 11;

pub const UNIT: u128 = PRECISION;
pub const GENESIS_MOMENT: u64 = 6_000;

thread_local! {
    static CONFIG: RefCell<ReserveConfig<u64>> = RefCell::new(default_config());
    static CIRCUIT_BREAKER: Cell<bool> = const { Cell::new(false) };

    // Fill prices: (sell, buy) -> buy units per sell unit, scaled by PRECISION
    static PRICES: RefCell<BTreeMap<(AssetKind, AssetKind), u128>> = const { RefCell::new(BTreeMap::new()) };

    // Advertised quotes; missing pairs quote at the fill price, zero means unpriceable
    static QUOTES: RefCell<BTreeMap<(AssetKind, AssetKind), u128>> = const { RefCell::new(BTreeMap::new()) };

    static FEE_RATE: Cell<Permill> = const { Cell::new(Permill::from_parts(0)) };
    static REVENUE: Cell<u128> = const { Cell::new(0) };
}

/// Two-asset stable basket, 0.5 of each per reserve token
pub fn default_config() -> ReserveConfig<u64> {
  ReserveConfig {
    basket: alloc::vec![
      CollateralEntry {
        asset: AssetKind::Local(USDC),
        quantity: PRECISION / 2,
        rate_limit: 10 * UNIT,
      },
      CollateralEntry {
        asset: AssetKind::Local(TUSD),
        quantity: PRECISION / 2,
        rate_limit: 10 * UNIT,
      },
    ],
    issuance_rate_per_step: 100 * UNIT,
    supply_expansion_rate: Perbill::from_percent(0),
    expenditure_fraction: DEFAULT_EXPENDITURE,
    revenue_batch_fraction: Perbill::from_percent(1),
    max_fee: DEFAULT_MAX_FEE,
    backstop_sell_rate: 5 * UNIT,
    max_redemption_fraction: DEFAULT_MAX_REDEMPTION,
    window_steps: 10,
    slippage_tolerance: None,
    protocol_fund: PROTOCOL_FUND,
    insurance_pool: INSURANCE_POOL,
    backstop_asset: AssetKind::Local(BACKSTOP),
  }
}

pub fn set_config(update: impl FnOnce(&mut ReserveConfig<u64>)) {
  CONFIG.with(|c| update(&mut c.borrow_mut()));
}

pub fn set_circuit_breaker(tripped: bool) {
  CIRCUIT_BREAKER.with(|b| b.set(tripped));
}

pub fn set_price(sell: AssetKind, buy: AssetKind, price: u128) {
  PRICES.with(|p| p.borrow_mut().insert((sell, buy), price));
}

pub fn set_quote(sell: AssetKind, buy: AssetKind, price: u128) {
  QUOTES.with(|q| q.borrow_mut().insert((sell, buy), price));
}

pub fn set_fee_rate(rate: Permill) {
  FEE_RATE.with(|f| f.set(rate));
}

pub fn notified_revenue() -> u128 {
  REVENUE.with(|r| r.get())
}

fn fill_price(sell: AssetKind, buy: AssetKind) -> u128 {
  PRICES.with(|p| p.borrow().get(&(sell, buy)).copied().unwrap_or(PRECISION))
}

pub fn asset_balance(id: u32, who: u64) -> u128 {
  <Assets as fungibles::Inspect<u64>>::balance(id, &who)
}

pub fn mint_asset(asset: AssetKind, who: &u64, amount: u128) -> DispatchResult {
  match asset {
    AssetKind::Native => {
      <Balances as fungible::Mutate<u64>>::mint_into(who, amount)?;
    }
    AssetKind::Local(id) | AssetKind::Foreign(id) => {
      <Assets as fungibles::Mutate<u64>>::mint_into(id, who, amount)?;
    }
  }
  Ok(())
}

pub fn burn_asset(asset: AssetKind, who: &u64, amount: u128) -> DispatchResult {
  match asset {
    AssetKind::Native => {
      <Balances as fungible::Mutate<u64>>::burn_from(
        who,
        amount,
        Preservation::Expendable,
        Precision::Exact,
        Fortitude::Polite,
      )?;
    }
    AssetKind::Local(id) | AssetKind::Foreign(id) => {
      <Assets as fungibles::Mutate<u64>>::burn_from(
        id,
        who,
        amount,
        Preservation::Expendable,
        Precision::Exact,
        Fortitude::Polite,
      )?;
    }
  }
  Ok(())
}

pub fn run_to_block(n: u64) {
  System::set_block_number(n);
}

pub fn set_time(moment: u64) {
  Timestamp::set_timestamp(moment);
}

type Block = frame_system::mocking::MockBlock<Test>;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    Balances: polkadot_sdk::pallet_balances,
    Assets: polkadot_sdk::pallet_assets,
    Timestamp: polkadot_sdk::pallet_timestamp,
    BasketReserve: pallet_basket_reserve,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = u64;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
  type AccountData = polkadot_sdk::pallet_balances::AccountData<u128>;
}

impl polkadot_sdk::pallet_balances::Config for Test {
  type MaxLocks = ();
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = u128;
  type DustRemoval = ();
  type RuntimeEvent = RuntimeEvent;
  type ExistentialDeposit = ConstU128<1>;
  type AccountStore = System;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = ();
  type RuntimeFreezeReason = ();
  type DoneSlashHandler = ();
}

impl polkadot_sdk::pallet_assets::Config for Test {
  type RuntimeEvent = RuntimeEvent;
  type Balance = u128;
  type AssetId = u32;
  type AssetIdParameter = u32;
  type Currency = Balances;
  type CreateOrigin = polkadot_sdk::frame_support::traits::AsEnsureOriginWithArg<
    frame_system::EnsureSigned<Self::AccountId>,
  >;
  type ForceOrigin = frame_system::EnsureRoot<Self::AccountId>;
  type AssetDeposit = ConstU128<1>;
  type AssetAccountDeposit = ConstU128<1>;
  type MetadataDepositBase = ConstU128<1>;
  type MetadataDepositPerByte = ConstU128<1>;
  type ApprovalDeposit = ConstU128<1>;
  type StringLimit = ConstU32<50>;
  type Freezer = ();
  type Extra = ();
  type ReserveData = ();
  type CallbackHandle = ();
  type WeightInfo = ();
  type RemoveItemsLimit = ConstU32<5>;
  type Holder = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = AssetBenchmarkHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct AssetBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl polkadot_sdk::pallet_assets::BenchmarkHelper<u32, ()> for AssetBenchmarkHelper {
  fn create_asset_id_parameter(id: u32) -> u32 {
    id
  }
  fn create_reserve_id_parameter(_id: u32) -> () {
    ()
  }
}

impl polkadot_sdk::pallet_timestamp::Config for Test {
  type Moment = u64;
  type OnTimestampSet = ();
  type MinimumPeriod = ConstU64<1>;
  type WeightInfo = ();
}

pub struct MockConfiguration;
impl ProvideConfiguration<u64> for MockConfiguration {
  fn current() -> ReserveConfig<u64> {
    CONFIG.with(|c| c.borrow().clone())
  }
}

pub struct MockCircuitBreaker;
impl CircuitBreaker for MockCircuitBreaker {
  fn is_tripped() -> bool {
    CIRCUIT_BREAKER.with(|b| b.get())
  }
}

/// Fixed-price market: burns what is sold and mints what is bought, ignoring `min_buy`
pub struct MockExchange;
impl Exchange<u64> for MockExchange {
  fn trade(
    who: &u64,
    sell: AssetKind,
    buy: AssetKind,
    sell_amount: u128,
    _min_buy: u128,
  ) -> DispatchResult {
    let bought = crate::math::mul_div_floor(sell_amount, fill_price(sell, buy), PRECISION)
      .ok_or(DispatchError::Other("Price overflow"))?;
    burn_asset(sell, who, sell_amount)?;
    if bought > 0 {
      mint_asset(buy, who, bought)?;
    }
    Ok(())
  }

  fn quote(sell: AssetKind, buy: AssetKind, sell_amount: u128) -> Option<u128> {
    let price = QUOTES
      .with(|q| q.borrow().get(&(sell, buy)).copied())
      .unwrap_or_else(|| fill_price(sell, buy));
    if price == 0 {
      return None;
    }
    crate::math::mul_div_floor(sell_amount, price, PRECISION)
  }
}

/// Pays backstop out of `INSURANCE_POOL` and records notified revenue
pub struct MockInsurancePool;
impl InsurancePool<u64> for MockInsurancePool {
  fn seize_reserve(beneficiary: &u64, amount: u128) -> Result<u128, DispatchError> {
    let seized = amount.min(asset_balance(BACKSTOP, INSURANCE_POOL));
    if seized > 0 {
      <Assets as fungibles::Mutate<u64>>::transfer(
        BACKSTOP,
        &INSURANCE_POOL,
        beneficiary,
        seized,
        Preservation::Expendable,
      )?;
    }
    Ok(seized)
  }

  fn notify_revenue(amount: u128) -> DispatchResult {
    REVENUE.with(|r| r.set(r.get().saturating_add(amount)));
    Ok(())
  }
}

pub struct MockFeeCalculator;
impl CalculateFee<u64> for MockFeeCalculator {
  fn calculate_fee(_from: &u64, _to: &u64, amount: u128) -> u128 {
    FEE_RATE.with(|f| f.get()).mul_floor(amount)
  }
}

pub struct PalletIdStub;
impl Get<PalletId> for PalletIdStub {
  fn get() -> PalletId {
    PalletId(*BASKET_RESERVE_PALLET_ID)
  }
}

impl pallet_basket_reserve::Config for Test {
  type Assets = Assets;
  type Currency = Balances;
  type TimeProvider = Timestamp;
  type PalletId = PalletIdStub;
  type ReserveTokenId = ConstU32<RESERVE>;
  type Precision = ConstU128<PRECISION>;
  type MaxBasketSize = ConstU32<MAX_BASKET_SIZE>;
  type MaxDrainPerStep = ConstU32<MAX_DRAIN_PER_STEP>;
  type Configuration = MockConfiguration;
  type CircuitBreaker = MockCircuitBreaker;
  type Exchange = MockExchange;
  type InsurancePool = MockInsurancePool;
  type FeeCalculator = MockFeeCalculator;
  type AdminOrigin = frame_system::EnsureRoot<u64>;
  type FreezeOrigin = frame_system::EnsureSigned<u64>;
  type WeightInfo = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = BasketReserveBenchmarkHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct BasketReserveBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl crate::BenchmarkHelper<u64> for BasketReserveBenchmarkHelper {
  fn fund(who: &u64, asset: AssetKind, amount: u128) -> DispatchResult {
    mint_asset(asset, who, amount)
  }
}

/// Genesis: ALICE holds 1000 reserve tokens backed by 500 USDC + 500 TUSD in the engine account
pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  build_ext(true)
}

pub fn new_test_ext_with_empty_battery() -> polkadot_sdk::sp_io::TestExternalities {
  build_ext(false)
}

fn build_ext(battery_starts_full: bool) -> polkadot_sdk::sp_io::TestExternalities {
  // Reset State
  CONFIG.with(|c| *c.borrow_mut() = default_config());
  CIRCUIT_BREAKER.with(|b| b.set(false));
  PRICES.with(|p| p.borrow_mut().clear());
  QUOTES.with(|q| q.borrow_mut().clear());
  FEE_RATE.with(|f| f.set(Permill::from_parts(0)));
  REVENUE.with(|r| r.set(0));

  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  let engine = BasketReserve::account_id();
  polkadot_sdk::pallet_assets::GenesisConfig::<Test> {
    assets: alloc::vec![
      (RESERVE, ALICE, true, 1),
      (BACKSTOP, ALICE, true, 1),
      (USDC, ALICE, true, 1),
      (TUSD, ALICE, true, 1),
    ],
    metadata: alloc::vec![],
    accounts: alloc::vec![
      (RESERVE, ALICE, 1_000 * UNIT),
      (USDC, ALICE, 10_000 * UNIT),
      (TUSD, ALICE, 10_000 * UNIT),
      (USDC, BOB, 1_000 * UNIT),
      (TUSD, BOB, 1_000 * UNIT),
      (USDC, engine, 500 * UNIT),
      (TUSD, engine, 500 * UNIT),
      (BACKSTOP, INSURANCE_POOL, 10_000 * UNIT),
    ],
    reserves: alloc::vec![],
    next_asset_id: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  pallet_basket_reserve::GenesisConfig::<Test> {
    battery_starts_full,
    ..Default::default()
  }
  .assimilate_storage(&mut t)
  .unwrap();

  let mut ext: polkadot_sdk::sp_io::TestExternalities = t.into();
  ext.execute_with(|| {
    System::set_block_number(1);
    set_time(GENESIS_MOMENT);
  });
  ext
}
