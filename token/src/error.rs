//! Token ledger errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("insufficient allowance: need {needed}, approved {available}")]
    InsufficientAllowance { needed: u128, available: u128 },

    #[error("arithmetic overflow in token balance")]
    Overflow,
}
