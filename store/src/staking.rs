use crate::StoreError;
use rider_types::AccountId;

/// Store trait for persisting the deposit entry store.
///
/// Uses opaque `Vec<u8>` so the store doesn't depend on the `rider-staking`
/// crate (which would create a circular dependency). The staking ledger
/// serializes/deserializes its own per-account deposit queues.
pub trait StakingStore {
    fn put_deposits(&self, account: &AccountId, deposits: &[u8]) -> Result<(), StoreError>;
    fn delete_deposits(&self, account: &AccountId) -> Result<(), StoreError>;
    fn iter_deposits(&self) -> Result<Vec<(AccountId, Vec<u8>)>, StoreError>;

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;
}
