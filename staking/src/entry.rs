//! Deposit entries and the per-user FIFO queue that holds them.

use serde::{Deserialize, Serialize};

use crate::accrual::{self, RewardRate};
use crate::error::StakingError;
use rider_types::{Amount, Timestamp};

/// One unit of staked principal and its reward bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositEntry {
    /// Principal still staked in this entry. Non-zero while the entry is live.
    pub principal: Amount,
    /// Reward paid out against this entry since `checkpoint`.
    pub claimed: Amount,
    /// Time-unit from which this entry's reward is measured.
    pub checkpoint: Timestamp,
}

impl DepositEntry {
    /// A freshly staked entry: nothing claimed, accrual starts at `now`.
    pub fn new(principal: Amount, now: Timestamp) -> Self {
        Self {
            principal,
            claimed: 0,
            checkpoint: now,
        }
    }

    /// Whether all principal has been withdrawn.
    pub fn is_emptied(&self) -> bool {
        self.principal == 0
    }

    /// Restart the accrual clock after the entry's reward was fully settled.
    pub(crate) fn restart(&mut self, now: Timestamp) {
        self.claimed = 0;
        self.checkpoint = now;
    }
}

/// A user's deposit entries in insertion order.
///
/// The front is the oldest entry. Entries are only ever appended at the back
/// or consumed from the front; nothing is reordered.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositQueue {
    entries: Vec<DepositEntry>,
}

impl DepositQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry at the tail. Returns its FIFO position.
    pub fn push(&mut self, entry: DepositEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    /// Entries oldest-first. Each call starts a fresh traversal.
    pub fn iter(&self) -> std::slice::Iter<'_, DepositEntry> {
        self.entries.iter()
    }

    /// Swap the first `count` entries for `head`, keeping the rest in order.
    pub(crate) fn replace_front(&mut self, count: usize, head: DepositQueue) {
        let count = count.min(self.entries.len());
        self.entries.splice(..count, head.entries);
    }

    pub fn as_slice(&self) -> &[DepositEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry whose principal reached zero, keeping survivors in
    /// order. Returns how many were dropped.
    pub fn remove_emptied(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !e.is_emptied());
        before - self.entries.len()
    }

    /// Sum of live principal.
    pub fn total_principal(&self) -> Result<Amount, StakingError> {
        self.entries.iter().try_fold(0u128, |acc, e| {
            acc.checked_add(e.principal)
                .ok_or(StakingError::ArithmeticOverflow)
        })
    }

    /// Sum of every entry's claimable reward at `now`.
    pub fn total_claimable(
        &self,
        now: Timestamp,
        rate: RewardRate,
    ) -> Result<Amount, StakingError> {
        self.entries.iter().try_fold(0u128, |acc, e| {
            acc.checked_add(accrual::claimable(e, now, rate)?)
                .ok_or(StakingError::ArithmeticOverflow)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accrual::DEFAULT_REWARD_RATE;

    fn queue_of(principals: &[Amount], at: u64) -> DepositQueue {
        let mut queue = DepositQueue::new();
        for &p in principals {
            queue.push(DepositEntry::new(p, Timestamp::new(at)));
        }
        queue
    }

    #[test]
    fn push_returns_fifo_position() {
        let mut queue = DepositQueue::new();
        assert_eq!(queue.push(DepositEntry::new(10, Timestamp::new(0))), 0);
        assert_eq!(queue.push(DepositEntry::new(20, Timestamp::new(1))), 1);
        let principals: Vec<_> = queue.iter().map(|e| e.principal).collect();
        assert_eq!(principals, vec![10, 20]);
    }

    #[test]
    fn remove_emptied_preserves_survivor_order() {
        let mut queue = queue_of(&[0, 20, 0, 40], 0);
        assert_eq!(queue.remove_emptied(), 2);
        let principals: Vec<_> = queue.iter().map(|e| e.principal).collect();
        assert_eq!(principals, vec![20, 40]);
    }

    #[test]
    fn remove_emptied_on_live_queue_is_a_no_op() {
        let mut queue = queue_of(&[5, 6], 0);
        assert_eq!(queue.remove_emptied(), 0);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn totals() {
        let mut queue = queue_of(&[100], 0);
        queue.push(DepositEntry::new(100, Timestamp::new(2)));
        assert_eq!(queue.total_principal().unwrap(), 200);
        assert_eq!(
            queue.total_claimable(Timestamp::new(2), DEFAULT_REWARD_RATE).unwrap(),
            200
        );
        assert_eq!(
            queue.total_claimable(Timestamp::new(3), DEFAULT_REWARD_RATE).unwrap(),
            400
        );
    }

    #[test]
    fn replace_front_swaps_only_the_head() {
        let mut queue = queue_of(&[1, 2, 3, 4], 0);
        queue.replace_front(2, queue_of(&[9], 5));
        let principals: Vec<_> = queue.iter().map(|e| e.principal).collect();
        assert_eq!(principals, vec![9, 3, 4]);
        assert_eq!(queue.as_slice()[0].checkpoint, Timestamp::new(5));

        queue.replace_front(10, DepositQueue::new());
        assert!(queue.is_empty());
    }

    #[test]
    fn restart_resets_claimed_and_checkpoint() {
        let mut entry = DepositEntry::new(50, Timestamp::new(1));
        entry.claimed = 40;
        entry.restart(Timestamp::new(9));
        assert_eq!(entry.claimed, 0);
        assert_eq!(entry.checkpoint, Timestamp::new(9));
        assert_eq!(entry.principal, 50);
    }

    #[test]
    fn empty_queue_totals_are_zero() {
        let queue = DepositQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.total_principal().unwrap(), 0);
        assert_eq!(
            queue.total_claimable(Timestamp::new(100), DEFAULT_REWARD_RATE).unwrap(),
            0
        );
    }
}
