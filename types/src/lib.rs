//! Fundamental types for the Rider staking ledger.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! account identifiers, token amounts and time-units.

pub mod address;
pub mod amount;
pub mod time;

pub use address::AccountId;
pub use amount::Amount;
pub use time::Timestamp;
