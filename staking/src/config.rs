//! Staking configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::accrual::RewardRate;
use crate::error::StakingError;
use rider_types::AccountId;

/// Configuration for a staking ledger.
///
/// Can be loaded from a TOML file via [`StakingConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingConfig {
    /// Token account that holds staked principal and the reward reserve.
    #[serde(default = "default_staking_account")]
    pub staking_account: AccountId,

    /// Reward accrual rate applied to every entry.
    #[serde(default)]
    pub reward_rate: RewardRate,
}

fn default_staking_account() -> AccountId {
    AccountId::new("staking")
}

impl StakingConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, StakingError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| StakingError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, StakingError> {
        let config: Self = toml::from_str(s).map_err(|e| StakingError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, StakingError> {
        toml::to_string_pretty(self).map_err(|e| StakingError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), StakingError> {
        if !self.staking_account.is_valid() {
            return Err(StakingError::Config(format!(
                "staking account {:?} is not a valid account id",
                self.staking_account.as_str()
            )));
        }
        self.reward_rate.validate()
    }
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            staking_account: default_staking_account(),
            reward_rate: RewardRate::default(),
        }
    }
}
