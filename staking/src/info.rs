//! Read-only view of a user's deposit entries.

use serde::Serialize;

use crate::entry::DepositQueue;
use rider_types::{Amount, Timestamp};

/// A user's live entries as parallel arrays indexed by FIFO position.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StakingInfo {
    pub principals: Vec<Amount>,
    pub claimed: Vec<Amount>,
    pub checkpoints: Vec<Timestamp>,
}

impl StakingInfo {
    pub fn from_queue(queue: &DepositQueue) -> Self {
        let mut info = Self {
            principals: Vec::with_capacity(queue.len()),
            claimed: Vec::with_capacity(queue.len()),
            checkpoints: Vec::with_capacity(queue.len()),
        };
        for entry in queue.iter() {
            info.principals.push(entry.principal);
            info.claimed.push(entry.claimed);
            info.checkpoints.push(entry.checkpoint);
        }
        info
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.principals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }
}
