//! Time-unit type used throughout the ledger.
//!
//! A `Timestamp` is an abstract, monotonically advancing time-unit supplied by
//! the execution environment (block height, slot, or wall-clock seconds). The
//! staking core only ever subtracts two of them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in ledger time, measured in whole time-units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Time zero.
    pub const EPOCH: Self = Self(0);

    pub fn new(units: u64) -> Self {
        Self(units)
    }

    pub fn as_units(&self) -> u64 {
        self.0
    }

    /// Time-units elapsed since this timestamp (relative to `now`).
    ///
    /// Saturates to zero when `now` precedes `self`.
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }

    /// This timestamp moved forward by `units`, saturating at `u64::MAX`.
    pub fn advanced_by(&self, units: u64) -> Timestamp {
        Self(self.0.saturating_add(units))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}
