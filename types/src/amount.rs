//! Token amounts.
//!
//! Every balance, principal and reward is a raw integer count of the smallest
//! token unit. There is no fixed-point scaling inside the ledger; display
//! denominations belong to the token, not to the staking core.

/// Raw token amount (smallest unit).
pub type Amount = u128;
