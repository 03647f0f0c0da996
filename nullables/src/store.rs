//! Nullable store: thread-safe in-memory staking storage for testing.

use rider_store::{StakingStore, StoreError};
use rider_types::AccountId;
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-memory [`StakingStore`] for testing.
pub struct NullStakingStore {
    deposits: Mutex<HashMap<AccountId, Vec<u8>>>,
    meta: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
}

impl NullStakingStore {
    pub fn new() -> Self {
        Self {
            deposits: Mutex::new(HashMap::new()),
            meta: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for NullStakingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StakingStore for NullStakingStore {
    fn put_deposits(&self, account: &AccountId, deposits: &[u8]) -> Result<(), StoreError> {
        self.deposits
            .lock()
            .unwrap()
            .insert(account.clone(), deposits.to_vec());
        Ok(())
    }

    fn delete_deposits(&self, account: &AccountId) -> Result<(), StoreError> {
        self.deposits
            .lock()
            .unwrap()
            .remove(account)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(account.to_string()))
    }

    fn iter_deposits(&self) -> Result<Vec<(AccountId, Vec<u8>)>, StoreError> {
        Ok(self
            .deposits
            .lock()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.meta.lock().unwrap().get(key).cloned())
    }

    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.meta
            .lock()
            .unwrap()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}
