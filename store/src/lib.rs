//! Abstract storage traits for the Rider staking ledger.
//!
//! Every storage backend implements these traits. The staking crate depends
//! only on the traits and serializes its own types into opaque bytes.

pub mod error;
pub mod staking;

pub use error::StoreError;
pub use staking::StakingStore;
