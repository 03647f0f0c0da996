//! The interface the staking core needs from a token ledger.

use crate::error::TokenError;
use rider_types::{AccountId, Amount};

/// A fungible token ledger with ERC-20 style allowance semantics.
///
/// Every mutating call is all-or-nothing: when it returns an error, no
/// balance, allowance or supply has changed.
pub trait FungibleLedger {
    /// Current balance of `account` (zero for unknown accounts).
    fn balance_of(&self, account: &AccountId) -> Amount;

    /// Amount `spender` may still move out of `owner` via [`transfer_from`].
    ///
    /// [`transfer_from`]: FungibleLedger::transfer_from
    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount;

    /// Sum of all balances ever minted.
    fn total_supply(&self) -> Amount;

    /// Set (not add to) the allowance `owner` grants `spender`.
    fn approve(
        &mut self,
        owner: &AccountId,
        spender: &AccountId,
        amount: Amount,
    ) -> Result<(), TokenError>;

    /// Move `amount` from `from` to `to`, authorised by `from` itself.
    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: Amount)
        -> Result<(), TokenError>;

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming
    /// `spender`'s allowance over `from`.
    fn transfer_from(
        &mut self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), TokenError>;

    /// Create `amount` new tokens in `to`. Setup and test tooling only.
    fn mint(&mut self, to: &AccountId, amount: Amount) -> Result<(), TokenError>;
}
