//! Fungible token ledger boundary.
//!
//! The staking core never owns balances. It moves value in and out of its own
//! account through the [`FungibleLedger`] trait, which any token backend can
//! implement. [`MemoryLedger`] is the in-process implementation used by the
//! scenario runner and by tests.

pub mod error;
pub mod ledger;
pub mod memory;

pub use error::TokenError;
pub use ledger::FungibleLedger;
pub use memory::MemoryLedger;
