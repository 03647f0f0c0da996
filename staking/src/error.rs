//! Staking-specific errors.

use rider_store::StoreError;
use rider_token::TokenError;
use rider_types::Timestamp;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StakingError {
    #[error("amount must be non-zero")]
    InvalidAmount,

    #[error("invalid account: {0}")]
    InvalidAccount(String),

    #[error("claim of {requested} exceeds claimable reward {available}")]
    ExceedsClaimable { requested: u128, available: u128 },

    #[error("unstake of {requested} exceeds staked principal {available}")]
    InsufficientPrincipal { requested: u128, available: u128 },

    #[error("insufficient reward reserve: need {needed}, available {available}")]
    InsufficientReserve { needed: u128, available: u128 },

    #[error("arithmetic overflow in staking computation")]
    ArithmeticOverflow,

    #[error("time {now} precedes latest recorded time {latest}")]
    InvalidTimestamp { now: Timestamp, latest: Timestamp },

    #[error("token ledger error: {0}")]
    Token(#[from] TokenError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("config error: {0}")]
    Config(String),
}
