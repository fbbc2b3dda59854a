//! Ecosystem Constants for the Basket Reserve
//!
//! Pallet identifiers and fundamental economic parameters shared by the engine, its mocks and
//! any runtime that hosts it.

/// Balance type alias for consistency across ecosystem
pub type Balance = u128;

/// Pallet identifiers for deriving pallet-owned accounts.
///
/// Used by `PalletId::into_account_truncating()` to derive the engine account that holds basket
/// collateral and the treasury buffer.
pub mod pallet_ids {
  /// Basket Reserve pallet ID (collateral custody and treasury buffer)
  pub const BASKET_RESERVE_PALLET_ID: &[u8; 8] = b"bsktrsv0";
}

/// Ecosystem parameters defining mathematical constants and thresholds.
pub mod params {
  use super::Balance;
  use sp_arithmetic::{Perbill, Permill};

  /// Precision scalar for basket quantities (10^12).
  ///
  /// A basket quantity of `PRECISION` means one unit of collateral per unit of reserve supply.
  pub const PRECISION: Balance = 1_000_000_000_000;

  /// Maximum number of assets in one basket snapshot.
  pub const MAX_BASKET_SIZE: u32 = 16;

  /// Maximum queued mints settled by one orchestrated step.
  pub const MAX_DRAIN_PER_STEP: u32 = 32;

  /// Default share of supply that may be redeemed within one window (10%).
  pub const DEFAULT_MAX_REDEMPTION: Perbill = Perbill::from_percent(10);

  /// Default cap on transfer fees (1%).
  pub const DEFAULT_MAX_FEE: Perbill = Perbill::from_percent(1);

  /// Default share of expansion routed to the protocol fund (50%).
  pub const DEFAULT_EXPENDITURE: Perbill = Perbill::from_percent(50);

  /// Default slippage tolerance when trade verification is enabled (2%).
  pub const DEFAULT_SLIPPAGE_TOLERANCE: Permill = Permill::from_percent(2);
}
