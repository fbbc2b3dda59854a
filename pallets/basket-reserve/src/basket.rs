//! Collateralization queries over a basket snapshot.
//!
//! An accountant is built from balances read at the moment of the query and lives no longer
//! than the step that built it.

use crate::{
  math,
  types::{Balance, CollateralEntry},
};
use alloc::vec::Vec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountingError {
  /// Balances do not line up with the basket
  LengthMismatch,
  /// Expected holdings do not fit in a balance
  Overflow,
}

pub struct BasketAccountant<'a> {
  basket: &'a [CollateralEntry],
  precision: Balance,
  balances: Vec<Balance>,
  /// Holdings that back the supply exactly, per basket index
  expected: Vec<Balance>,
}

impl<'a> BasketAccountant<'a> {
  /// `balances[i]` is the engine's live holding of `basket[i].asset`.
  pub fn new(
    basket: &'a [CollateralEntry],
    supply: Balance,
    precision: Balance,
    balances: Vec<Balance>,
  ) -> Result<Self, AccountingError> {
    if balances.len() != basket.len() {
      return Err(AccountingError::LengthMismatch);
    }
    let expected = basket
      .iter()
      .map(|entry| math::mul_div_floor(supply, entry.quantity, precision))
      .collect::<Option<Vec<_>>>()
      .ok_or(AccountingError::Overflow)?;
    Ok(Self {
      basket,
      precision,
      balances,
      expected,
    })
  }

  /// Shortfall of asset `i` in supply units, `None` when not short.
  ///
  /// Saturates; the value only ranks assets against each other.
  pub fn deficit_normed(&self, i: usize) -> Option<Balance> {
    let shortfall = self.expected[i].checked_sub(self.balances[i]).filter(|s| *s > 0)?;
    self.normalize(i, shortfall)
  }

  /// Excess of asset `i` beyond its target and rate limit, in supply units.
  pub fn surplus_normed(&self, i: usize) -> Option<Balance> {
    let excess = self.tradeable_surplus(i);
    if excess == 0 {
      return None;
    }
    self.normalize(i, excess)
  }

  /// Amount of asset `i` that may be sold without dipping under target plus rate limit
  pub fn tradeable_surplus(&self, i: usize) -> Balance {
    self.balances[i]
      .saturating_sub(self.expected[i])
      .saturating_sub(self.basket[i].rate_limit)
  }

  /// Index with the largest normalized deficit, lowest index on ties.
  pub fn least_collateralized(&self) -> Option<usize> {
    Self::argmax((0..self.basket.len()).map(|i| self.deficit_normed(i)))
  }

  /// Index with the largest normalized surplus, lowest index on ties.
  pub fn most_collateralized(&self) -> Option<usize> {
    Self::argmax((0..self.basket.len()).map(|i| self.surplus_normed(i)))
  }

  pub fn is_fully_collateralized(&self) -> bool {
    self
      .balances
      .iter()
      .zip(self.expected.iter())
      .all(|(balance, expected)| balance >= expected)
  }

  fn normalize(&self, i: usize, amount: Balance) -> Option<Balance> {
    let quantity = self.basket[i].quantity;
    if quantity == 0 {
      return None;
    }
    Some(math::mul_div_floor(amount, self.precision, quantity).unwrap_or(Balance::MAX))
  }

  fn argmax(values: impl Iterator<Item = Option<Balance>>) -> Option<usize> {
    let mut best: Option<(usize, Balance)> = None;
    for (i, value) in values.enumerate() {
      let Some(value) = value else { continue };
      if best.is_none_or(|(_, top)| value > top) {
        best = Some((i, value));
      }
    }
    best.map(|(i, _)| i)
  }
}
