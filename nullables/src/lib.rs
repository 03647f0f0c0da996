//! Nullable infrastructure for deterministic testing.
//!
//! The staking ledger takes time as an argument and persists through the
//! [`rider_store::StakingStore`] trait. This crate provides stand-ins that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem
//!
//! Usage: drive the ledger's `now` from a [`NullClock`] and persist into a
//! [`NullStakingStore`].

pub mod clock;
pub mod store;

pub use clock::NullClock;
pub use store::NullStakingStore;
