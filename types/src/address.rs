//! Account identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a ledger participant: a user, the staking contract, a funder.
///
/// The staking core never authenticates this value; it only uses it to key
/// balances and deposit queues. Authentication happens before a call arrives.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Return the raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An identifier is usable when it is non-empty and has no surrounding whitespace.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty() && self.0.trim() == self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
