use alloc::vec::Vec;
use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use frame::deps::sp_runtime::{Perbill, Permill};
use primitives::AssetKind;
use scale_info::TypeInfo;

pub use primitives::Balance;

/// Position of a pending mint in the issuance queue
pub type QueueIndex = u64;

/// One asset of the backing basket.
///
/// `quantity` is a fixed-point amount (scaled by `Config::Precision`) of the asset required per
/// unit of reserve supply. `rate_limit` caps how much of the asset may be sold per block when it
/// is the most collateralized, and is also kept out of the tradeable surplus.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
)]
pub struct CollateralEntry {
  pub asset: AssetKind,
  pub quantity: Balance,
  pub rate_limit: Balance,
}

/// Mint waiting in the issuance queue
#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, MaxEncodedLen, PartialEq, TypeInfo,
)]
pub struct PendingMint<AccountId> {
  pub recipient: AccountId,
  pub amount: Balance,
}

/// Redemption throttle state.
///
/// `charge` never exceeds `max_redemption_fraction × last_supply`.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
)]
pub struct BatteryState<BlockNumber> {
  pub last_step: BlockNumber,
  pub last_supply: Balance,
  pub charge: Balance,
}

/// Configuration snapshot taken at the start of every step
#[derive(Clone, Debug, Decode, Encode, Eq, PartialEq, TypeInfo)]
pub struct ReserveConfig<AccountId> {
  /// Target basket, in tie-break order
  pub basket: Vec<CollateralEntry>,
  /// Reserve tokens the issuance queue may mint per elapsed block
  pub issuance_rate_per_step: Balance,
  /// Yearly supply growth
  pub supply_expansion_rate: Perbill,
  /// Share of every expansion minted to the protocol fund
  pub expenditure_fraction: Perbill,
  /// Treasury buffer size, relative to supply, above which the buffer is swept
  pub revenue_batch_fraction: Perbill,
  /// Upper bound of the transfer fee relative to the transferred amount
  pub max_fee: Perbill,
  /// Backstop asset seized per block while the basket is only in deficit
  pub backstop_sell_rate: Balance,
  /// Share of supply that may be redeemed within one window
  pub max_redemption_fraction: Perbill,
  /// Blocks to fully recharge the battery; also caps banked issuance budget
  pub window_steps: u32,
  /// `None` trusts the exchange; `Some` requires fills within the tolerance of its quote
  pub slippage_tolerance: Option<Permill>,
  pub protocol_fund: AccountId,
  pub insurance_pool: AccountId,
  pub backstop_asset: AssetKind,
}

/// How the issuance queue pays for settlement
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrainMode {
  /// Spend the elapsed-block budget
  Budgeted,
  /// Administrative unblock, budget ignored
  Forced,
}

/// Result of one queue drain
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrainOutcome {
  /// Circuit breaker tripped, nothing touched
  Halted,
  Progress {
    settled: u32,
    minted: Balance,
    blocked: bool,
  },
}

/// Trade path chosen by the rebalance engine
#[derive(
  Clone, Copy, Debug, Decode, DecodeWithMemTracking, Encode, Eq, MaxEncodedLen, PartialEq, TypeInfo,
)]
pub enum RebalanceBranch {
  /// Nothing to do
  Idle,
  /// Surplus asset sold for the deficit asset
  Swap,
  /// Backstop seized and sold for the deficit asset
  Backstop,
  /// Surplus sold for the backstop asset and handed to the insurance pool
  Accumulate,
}
