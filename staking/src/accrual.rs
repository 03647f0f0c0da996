//! Accrual engine: pure reward computation for a single deposit entry.

use serde::{Deserialize, Serialize};

use crate::entry::DepositEntry;
use crate::error::StakingError;
use rider_types::{Amount, Timestamp};

/// Reward units paid per staked unit per elapsed time-unit, as a fraction.
///
/// `reward = principal × elapsed × numerator / denominator`, rounded down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardRate {
    pub numerator: u64,
    pub denominator: u64,
}

/// The rate every ledger uses unless configured otherwise: one reward unit
/// per staked unit per time-unit.
pub const DEFAULT_REWARD_RATE: RewardRate = RewardRate {
    numerator: 1,
    denominator: 1,
};

impl RewardRate {
    pub fn new(numerator: u64, denominator: u64) -> Result<Self, StakingError> {
        let rate = Self {
            numerator,
            denominator,
        };
        rate.validate()?;
        Ok(rate)
    }

    pub fn validate(&self) -> Result<(), StakingError> {
        if self.denominator == 0 {
            return Err(StakingError::Config(
                "reward rate denominator must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Reward earned by `principal` over `elapsed` time-units.
    ///
    /// Returns `None` on overflow or a zero denominator.
    pub fn reward_for(&self, principal: Amount, elapsed: u64) -> Option<Amount> {
        principal
            .checked_mul(elapsed as u128)?
            .checked_mul(self.numerator as u128)?
            .checked_div(self.denominator as u128)
    }
}

impl Default for RewardRate {
    fn default() -> Self {
        DEFAULT_REWARD_RATE
    }
}

/// Total reward accrued by `entry` since its checkpoint, including the part
/// already claimed.
pub fn accrued(
    entry: &DepositEntry,
    now: Timestamp,
    rate: RewardRate,
) -> Result<Amount, StakingError> {
    let elapsed = entry.checkpoint.elapsed_since(now);
    rate.reward_for(entry.principal, elapsed)
        .ok_or(StakingError::ArithmeticOverflow)
}

/// Reward accrued by `entry` and not yet paid out.
///
/// Zero when `now` precedes the point at which the entry was last claimed
/// against; the ledger never mutates at such a time.
pub fn claimable(
    entry: &DepositEntry,
    now: Timestamp,
    rate: RewardRate,
) -> Result<Amount, StakingError> {
    Ok(accrued(entry, now, rate)?.saturating_sub(entry.claimed))
}
