//! Rider staking ledger.
//!
//! Users deposit a fungible token; every deposit becomes its own entry that
//! accrues reward linearly with elapsed time-units:
//!
//! `accrued(e, now) = principal(e) × (now − checkpoint(e)) × rate`
//!
//! Claims draw reward down from the oldest entry first. Unstakes return
//! principal oldest-first and settle the full outstanding reward of every
//! entry they touch. A partially consumed entry restarts its accrual clock.
//!
//! This crate handles:
//! - Linear reward accrual with a configurable rate
//! - Per-user FIFO deposit queues
//! - Atomic stake / claim / unstake against a [`rider_token::FungibleLedger`]
//! - Read-only staking queries and persistence through [`rider_store::StakingStore`]

pub mod accrual;
pub mod config;
pub mod entry;
pub mod error;
pub mod info;
pub mod ledger;
pub mod receipt;
pub mod store;

pub use accrual::{RewardRate, DEFAULT_REWARD_RATE};
pub use config::StakingConfig;
pub use entry::{DepositEntry, DepositQueue};
pub use error::StakingError;
pub use info::StakingInfo;
pub use ledger::StakingLedger;
pub use receipt::{ClaimAllocation, ClaimReceipt, StakeReceipt, UnstakeReceipt};
pub use store::DepositStore;
