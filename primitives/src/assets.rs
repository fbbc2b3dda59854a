use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Single source of truth for asset identifiers across the reserve engine.
///
/// Basket collateral, the backstop asset sold by the insurance pool and the elastic reserve
/// token itself are all addressed through this enum.
///
/// - `Native`: the chain's native token (managed by pallet-balances).
/// - `Local(u32)`: assets managed by pallet-assets.
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
  Ord,
  PartialEq,
  PartialOrd,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub enum AssetKind {
  /// Native token managed by pallet-balances
  #[default]
  Native,
  /// Local asset managed by pallet-assets
  Local(u32),
  /// Foreign asset managed by pallet-assets via XCM mapping
  Foreign(u32),
}

impl From<u32> for AssetKind {
  fn from(asset_id: u32) -> Self {
    AssetKind::Local(asset_id)
  }
}

impl AssetKind {
  /// pallet-assets id backing this asset, `None` for the native token.
  pub fn asset_id(&self) -> Option<u32> {
    match self {
      AssetKind::Local(id) | AssetKind::Foreign(id) => Some(*id),
      AssetKind::Native => None,
    }
  }
}

/// Well-known asset ids used by the default deployment
pub mod well_known {
  /// The elastic-supply reserve token
  pub const RESERVE_TOKEN: u32 = 1;
  /// Backstop asset held by the insurance pool and sold as collateral of last resort
  pub const BACKSTOP: u32 = 2;
}
