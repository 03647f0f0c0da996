//! Deposit entry store: every user's FIFO queue, plus principal totals.

use std::collections::HashMap;

use crate::accrual::RewardRate;
use crate::entry::{DepositEntry, DepositQueue};
use crate::error::StakingError;
use rider_types::{AccountId, Amount, Timestamp};

/// Replacement entries for the front of one user's queue, checked against
/// the store's totals.
///
/// Produced by [`DepositStore::stage`]; committing it cannot fail, so a
/// caller can stage, perform the token movement, and only then commit.
#[derive(Debug)]
pub struct StagedHead {
    account: AccountId,
    replaced: usize,
    head: DepositQueue,
    staked_after: Amount,
    locked_after: Amount,
}

impl StagedHead {
    /// Entries that will take the place of the first `replaced()` entries.
    pub fn head(&self) -> &DepositQueue {
        &self.head
    }

    pub fn replaced(&self) -> usize {
        self.replaced
    }
}

#[derive(Clone, Debug, Default)]
struct UserDeposits {
    queue: DepositQueue,
    /// Sum of `queue`'s principal.
    staked: Amount,
}

/// Per-user deposit queues.
///
/// Users with no live entries have no key, and a stored queue never holds
/// an emptied entry. Each user's principal total and the global `locked`
/// total are kept up to date on every change, so neither is recomputed by
/// walking entries.
#[derive(Clone, Debug, Default)]
pub struct DepositStore {
    users: HashMap<AccountId, UserDeposits>,
    locked: Amount,
}

impl DepositStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that appending `principal` for `account` keeps every total in
    /// range. [`append`](Self::append) relies on this having passed.
    pub fn check_append(&self, account: &AccountId, principal: Amount) -> Result<(), StakingError> {
        self.total_principal(account)
            .checked_add(principal)
            .and(self.locked.checked_add(principal))
            .map(|_| ())
            .ok_or(StakingError::ArithmeticOverflow)
    }

    /// Append a new entry at the tail of `account`'s queue. Returns the
    /// entry's FIFO position.
    ///
    /// Callers validate the amount with [`check_append`](Self::check_append)
    /// first. A zero principal adds nothing.
    pub fn append(&mut self, account: &AccountId, principal: Amount, now: Timestamp) -> usize {
        if principal == 0 {
            return self.users.get(account).map_or(0, |u| u.queue.len());
        }
        let user = self.users.entry(account.clone()).or_default();
        user.staked = user.staked.saturating_add(principal);
        self.locked = self.locked.saturating_add(principal);
        user.queue.push(DepositEntry::new(principal, now))
    }

    /// `account`'s entries oldest-first; empty when it has none.
    ///
    /// Each call starts a fresh traversal.
    pub fn for_each_fifo(&self, account: &AccountId) -> std::slice::Iter<'_, DepositEntry> {
        self.queue(account)
            .map(DepositQueue::as_slice)
            .unwrap_or(&[])
            .iter()
    }

    pub fn queue(&self, account: &AccountId) -> Option<&DepositQueue> {
        self.users.get(account).map(|u| &u.queue)
    }

    /// Validate replacing the first `replaced` entries of `account`'s queue
    /// with `head`, and compute the totals that would leave behind.
    ///
    /// Only the replaced entries are read. `head` must not hold emptied
    /// entries.
    pub fn stage(
        &self,
        account: &AccountId,
        replaced: usize,
        head: DepositQueue,
    ) -> Result<StagedHead, StakingError> {
        let replaced = replaced.min(self.queue(account).map_or(0, DepositQueue::len));
        let removed = self
            .for_each_fifo(account)
            .take(replaced)
            .try_fold(0u128, |acc, e| acc.checked_add(e.principal))
            .ok_or(StakingError::ArithmeticOverflow)?;
        let added = head.total_principal()?;

        let staked_after = self
            .total_principal(account)
            .checked_sub(removed)
            .and_then(|rest| rest.checked_add(added))
            .ok_or(StakingError::ArithmeticOverflow)?;
        let locked_after = self
            .locked
            .checked_sub(removed)
            .and_then(|rest| rest.checked_add(added))
            .ok_or(StakingError::ArithmeticOverflow)?;
        Ok(StagedHead {
            account: account.clone(),
            replaced,
            head,
            staked_after,
            locked_after,
        })
    }

    /// Apply a staged head replacement.
    pub fn commit(&mut self, staged: StagedHead) {
        let StagedHead {
            account,
            replaced,
            head,
            staked_after,
            locked_after,
        } = staged;
        let user = self.users.entry(account.clone()).or_default();
        user.queue.replace_front(replaced, head);
        user.staked = staked_after;
        if user.queue.is_empty() {
            self.users.remove(&account);
        }
        self.locked = locked_after;
    }

    /// Install a whole queue for `account`, e.g. when loading from storage.
    /// Emptied entries are dropped.
    pub fn restore(&mut self, account: &AccountId, mut queue: DepositQueue) -> Result<(), StakingError> {
        queue.remove_emptied();
        let staked = queue.total_principal()?;
        let locked = self
            .locked
            .checked_sub(self.total_principal(account))
            .and_then(|rest| rest.checked_add(staked))
            .ok_or(StakingError::ArithmeticOverflow)?;
        if queue.is_empty() {
            self.users.remove(account);
        } else {
            self.users
                .insert(account.clone(), UserDeposits { queue, staked });
        }
        self.locked = locked;
        Ok(())
    }

    /// Sum of `account`'s claimable reward at `now`.
    pub fn total_claimable(
        &self,
        account: &AccountId,
        now: Timestamp,
        rate: RewardRate,
    ) -> Result<Amount, StakingError> {
        match self.queue(account) {
            Some(queue) => queue.total_claimable(now, rate),
            None => Ok(0),
        }
    }

    /// Sum of `account`'s live principal.
    pub fn total_principal(&self, account: &AccountId) -> Amount {
        self.users.get(account).map_or(0, |u| u.staked)
    }

    /// Live principal across every user.
    pub fn locked(&self) -> Amount {
        self.locked
    }

    /// Every user with at least one live entry, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &DepositQueue)> {
        self.users.iter().map(|(account, u)| (account, &u.queue))
    }

    pub fn account_count(&self) -> usize {
        self.users.len()
    }
}
