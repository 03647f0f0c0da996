//! Outcomes of successful staking calls.

use serde::Serialize;

use rider_types::{Amount, Timestamp};

/// A new deposit entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StakeReceipt {
    /// FIFO position of the new entry in the user's queue.
    pub entry_index: usize,
    pub principal: Amount,
    pub checkpoint: Timestamp,
}

/// Reward drawn from one entry by a claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClaimAllocation {
    /// FIFO position at the time of the claim.
    pub entry_index: usize,
    pub amount: Amount,
}

/// A paid-out reward claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClaimReceipt {
    pub amount: Amount,
    /// Per-entry draw-down, oldest entry first. Amounts sum to `amount`.
    pub allocations: Vec<ClaimAllocation>,
}

/// A principal withdrawal with its settled reward.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UnstakeReceipt {
    pub principal: Amount,
    /// Outstanding reward of every touched entry.
    pub reward: Amount,
    /// `principal + reward`, sent to the user in a single transfer.
    pub payout: Amount,
    /// Entries whose principal reached zero.
    pub entries_removed: usize,
}
