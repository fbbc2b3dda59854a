//! Delayed issuance queue.
//!
//! Deposits become reserve tokens only after enough blocks have passed for the issuance rate
//! to cover them. Entries settle strictly in FIFO order and never partially: a head that does
//! not fit in the remaining budget blocks everything behind it.

use crate::{
  CircuitBreaker, Config, ConfigOf, Error, Event, LOG_TARGET, LastDrainStep, MintPermit, Pallet, PendingIssuance,
  PendingMints, QueueHead, QueueTail, math,
  types::{Balance, DrainMode, DrainOutcome, PendingMint, QueueIndex},
};
use frame::{
  deps::{
    frame_support::traits::fungibles::Mutate,
    sp_runtime::traits::{SaturatedConversion, Saturating},
  },
  prelude::*,
};

impl<T: Config> Pallet<T> {
  /// Append a mint to the tail of the queue. `amount` is non-zero.
  pub(crate) fn enqueue_mint(
    recipient: T::AccountId,
    amount: Balance,
  ) -> Result<QueueIndex, DispatchError> {
    let index = QueueTail::<T>::get();
    let next = index.checked_add(1).ok_or(Error::<T>::ArithmeticOverflow)?;
    let pending = PendingIssuance::<T>::get()
      .checked_add(amount)
      .ok_or(Error::<T>::ArithmeticOverflow)?;

    PendingMints::<T>::insert(
      index,
      PendingMint {
        recipient: recipient.clone(),
        amount,
      },
    );
    QueueTail::<T>::put(next);
    PendingIssuance::<T>::put(pending);

    Self::deposit_event(Event::IssuanceQueued {
      recipient,
      index,
      amount,
    });
    Ok(index)
  }

  /// Credit freshly minted reserve tokens.
  pub(crate) fn credit_mint(
    _permit: &MintPermit,
    who: &T::AccountId,
    amount: Balance,
  ) -> DispatchResult {
    T::Assets::mint_into(T::ReserveTokenId::get(), who, amount)?;
    Ok(())
  }

  /// Settle up to `max_entries` queued mints from the head.
  ///
  /// In `Budgeted` mode the budget is the number of blocks since the issuance clock, capped at
  /// one window. Each settled entry consumes `ceil(amount / rate)` blocks; the clock advances by
  /// what was consumed so leftover blocks stay banked while entries wait, and jumps to the
  /// current block once the queue is empty. `Forced` ignores the budget and, once it settles
  /// anything, moves the clock to the current block.
  pub(crate) fn drain_issuance(
    permit: &MintPermit,
    config: &ConfigOf<T>,
    max_entries: u32,
    mode: DrainMode,
  ) -> Result<DrainOutcome, DispatchError> {
    if T::CircuitBreaker::is_tripped() {
      return Ok(DrainOutcome::Halted);
    }

    let now = frame_system::Pallet::<T>::block_number();
    let rate = config.issuance_rate_per_step;
    let window: BlockNumberFor<T> = config.window_steps.into();
    let elapsed = now.saturating_sub(LastDrainStep::<T>::get()).min(window);
    let base = now.saturating_sub(elapsed);
    let mut remaining: u128 = elapsed.saturated_into();
    let mut consumed: u128 = 0;

    let mut head = QueueHead::<T>::get();
    let tail = QueueTail::<T>::get();
    let mut settled = 0u32;
    let mut minted: Balance = 0;
    let mut blocked = false;

    while settled < max_entries && head < tail {
      let entry = PendingMints::<T>::get(head).ok_or(Error::<T>::QueueEntryMissing)?;

      if mode == DrainMode::Budgeted {
        // A zero rate has no finite cost.
        match math::div_ceil(entry.amount, rate) {
          Some(cost) if cost <= remaining => {
            remaining -= cost;
            consumed += cost;
          }
          _ => {
            let available = remaining.saturating_mul(rate);
            log::warn!(
              target: LOG_TARGET,
              "issuance head {} ({}) exceeds budget {}",
              head,
              entry.amount,
              available
            );
            Self::deposit_event(Event::IssuanceBlocked {
              index: head,
              amount: entry.amount,
              available,
            });
            blocked = true;
            break;
          }
        }
      }

      Self::credit_mint(permit, &entry.recipient, entry.amount)?;
      PendingMints::<T>::remove(head);
      PendingIssuance::<T>::mutate(|pending| *pending = pending.saturating_sub(entry.amount));
      Self::deposit_event(Event::IssuanceSettled {
        recipient: entry.recipient,
        index: head,
        amount: entry.amount,
      });

      minted = minted.saturating_add(entry.amount);
      head += 1;
      settled += 1;
    }

    QueueHead::<T>::put(head);
    match mode {
      DrainMode::Budgeted => {
        let clock = if head == tail {
          now
        } else {
          base.saturating_add(consumed.saturated_into())
        };
        LastDrainStep::<T>::put(clock);
      }
      // Forced settlement spends whatever was banked behind the blocked head.
      DrainMode::Forced if settled > 0 => LastDrainStep::<T>::put(now),
      DrainMode::Forced => {}
    }

    Ok(DrainOutcome::Progress {
      settled,
      minted,
      blocked,
    })
  }
}
