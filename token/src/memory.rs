//! In-memory token ledger.

use std::collections::HashMap;

use crate::error::TokenError;
use crate::ledger::FungibleLedger;
use rider_types::{AccountId, Amount};

/// A `HashMap`-backed [`FungibleLedger`].
#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    balances: HashMap<AccountId, Amount>,
    /// (owner, spender) → remaining allowance.
    allowances: HashMap<(AccountId, AccountId), Amount>,
    total_supply: Amount,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn move_balance(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        if from == to || amount == 0 {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.balances.insert(from.clone(), available - amount);
        self.balances.insert(to.clone(), credited);
        Ok(())
    }
}

impl FungibleLedger for MemoryLedger {
    fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    fn total_supply(&self) -> Amount {
        self.total_supply
    }

    fn approve(
        &mut self,
        owner: &AccountId,
        spender: &AccountId,
        amount: Amount,
    ) -> Result<(), TokenError> {
        tracing::trace!(%owner, %spender, amount, "approve");
        self.allowances
            .insert((owner.clone(), spender.clone()), amount);
        Ok(())
    }

    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), TokenError> {
        self.move_balance(from, to, amount)?;
        tracing::trace!(%from, %to, amount, "transfer");
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let approved = self.allowance(from, spender);
        if approved < amount {
            return Err(TokenError::InsufficientAllowance {
                needed: amount,
                available: approved,
            });
        }
        self.move_balance(from, to, amount)?;
        self.allowances
            .insert((from.clone(), spender.clone()), approved - amount);
        tracing::trace!(%spender, %from, %to, amount, "transfer_from");
        Ok(())
    }

    fn mint(&mut self, to: &AccountId, amount: Amount) -> Result<(), TokenError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.total_supply = supply;
        self.balances.insert(to.clone(), credited);
        tracing::trace!(%to, amount, "mint");
        Ok(())
    }
}
