//! Scenario scripts: token setup, a list of steps, and the JSON report a run
//! produces.
//!
//! Time is driven by a [`NullClock`]. Every transaction step executes at the
//! clock's current time-unit and then advances it by `auto_advance`, so with
//! the default of 1 each transaction lands in its own block.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use rider_nullables::NullClock;
use rider_staking::{
    ClaimReceipt, StakeReceipt, StakingConfig, StakingError, StakingInfo, StakingLedger,
    UnstakeReceipt,
};
use rider_token::{FungibleLedger, MemoryLedger};
use rider_types::{AccountId, Amount, Timestamp};
use rider_utils::LoggingConfig;

/// A scenario file.
///
/// Amounts are written as TOML integers and widened to [`Amount`] on use.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Time-unit of the first step.
    #[serde(default)]
    pub start_time: u64,

    /// Time-units the clock moves after each transaction step.
    #[serde(default = "default_auto_advance")]
    pub auto_advance: u64,

    #[serde(default)]
    pub staking: StakingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Balances created before the first step.
    #[serde(default)]
    pub mint: Vec<Mint>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_auto_advance() -> u64 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Mint {
    pub account: AccountId,
    pub amount: u64,
}

/// One scripted action. The `action` key selects the variant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Set the allowance `account` grants the staking account.
    Approve { account: AccountId, amount: u64 },
    Stake { account: AccountId, amount: u64 },
    Claim { account: AccountId, amount: u64 },
    ClaimAll { account: AccountId },
    Unstake { account: AccountId, amount: u64 },
    UnstakeAll { account: AccountId },
    FundReserve { account: AccountId, amount: u64 },
    /// Move the clock forward without a transaction.
    Advance { units: u64 },
    /// Record a snapshot of `account` without a transaction.
    Query { account: AccountId },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Approve { .. } => "approve",
            Self::Stake { .. } => "stake",
            Self::Claim { .. } => "claim",
            Self::ClaimAll { .. } => "claim_all",
            Self::Unstake { .. } => "unstake",
            Self::UnstakeAll { .. } => "unstake_all",
            Self::FundReserve { .. } => "fund_reserve",
            Self::Advance { .. } => "advance",
            Self::Query { .. } => "query",
        }
    }

    fn account(&self) -> Option<&AccountId> {
        match self {
            Self::Approve { account, .. }
            | Self::Stake { account, .. }
            | Self::Claim { account, .. }
            | Self::ClaimAll { account }
            | Self::Unstake { account, .. }
            | Self::UnstakeAll { account }
            | Self::FundReserve { account, .. }
            | Self::Query { account } => Some(account),
            Self::Advance { .. } => None,
        }
    }

    /// Whether the step is a transaction that occupies a block.
    fn is_transaction(&self) -> bool {
        !matches!(self, Self::Advance { .. } | Self::Query { .. })
    }
}

impl Scenario {
    pub fn from_toml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("failed to parse scenario {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

/// What a step did.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Approved {
        owner: AccountId,
        spender: AccountId,
        amount: Amount,
    },
    Staked(StakeReceipt),
    Claimed(ClaimReceipt),
    Unstaked(UnstakeReceipt),
    Funded {
        amount: Amount,
        reserve: Amount,
    },
    Advanced {
        now: Timestamp,
    },
    Snapshot(AccountSnapshot),
    Failed {
        error: String,
    },
}

#[derive(Debug, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub action: &'static str,
    pub time: Timestamp,
    pub outcome: Outcome,
}

/// An account's token balance and staking position at one time-unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSnapshot {
    pub account: AccountId,
    pub balance: Amount,
    pub staked: Amount,
    pub claimable: Amount,
    pub entries: StakingInfo,
}

/// An account's final state, or why it could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AccountState {
    Snapshot(AccountSnapshot),
    Failed { account: AccountId, error: String },
}

impl AccountState {
    pub fn account(&self) -> &AccountId {
        match self {
            AccountState::Snapshot(snap) => &snap.account,
            AccountState::Failed { account, .. } => account,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub staking_account: AccountId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub reward_reserve: Amount,
    pub total_principal: Amount,
    pub failures: usize,
    pub steps: Vec<StepReport>,
    /// Every non-staking account the scenario touched, sorted by id.
    pub accounts: Vec<AccountState>,
}

struct Runner {
    ledger: StakingLedger<MemoryLedger>,
    clock: NullClock,
    auto_advance: u64,
    accounts: BTreeSet<AccountId>,
}

impl Runner {
    fn new(scenario: &Scenario) -> anyhow::Result<Self> {
        let mut token = MemoryLedger::new();
        let mut accounts = BTreeSet::new();
        for mint in &scenario.mint {
            token
                .mint(&mint.account, Amount::from(mint.amount))
                .with_context(|| format!("failed to mint {} to {}", mint.amount, mint.account))?;
            accounts.insert(mint.account.clone());
        }
        let ledger = StakingLedger::new(scenario.staking.clone(), token)
            .context("invalid staking configuration")?;
        Ok(Self {
            ledger,
            clock: NullClock::new(scenario.start_time),
            auto_advance: scenario.auto_advance,
            accounts,
        })
    }

    fn snapshot(&self, account: &AccountId) -> Result<AccountSnapshot, StakingError> {
        let now = self.clock.now();
        Ok(AccountSnapshot {
            account: account.clone(),
            balance: self.ledger.token().balance_of(account),
            staked: self.ledger.total_staked(account),
            claimable: self.ledger.total_claimable(account, now)?,
            entries: self.ledger.staking_info(account),
        })
    }

    fn execute(&mut self, step: &Step, now: Timestamp) -> Result<Outcome, StakingError> {
        let outcome = match step {
            Step::Approve { account, amount } => {
                let spender = self.ledger.staking_account().clone();
                let amount = Amount::from(*amount);
                self.ledger.token_mut().approve(account, &spender, amount)?;
                Outcome::Approved {
                    owner: account.clone(),
                    spender,
                    amount,
                }
            }
            Step::Stake { account, amount } => {
                Outcome::Staked(self.ledger.stake(account, Amount::from(*amount), now)?)
            }
            Step::Claim { account, amount } => {
                Outcome::Claimed(self.ledger.claim(account, Amount::from(*amount), now)?)
            }
            Step::ClaimAll { account } => Outcome::Claimed(self.ledger.claim_all(account, now)?),
            Step::Unstake { account, amount } => {
                Outcome::Unstaked(self.ledger.unstake(account, Amount::from(*amount), now)?)
            }
            Step::UnstakeAll { account } => {
                Outcome::Unstaked(self.ledger.unstake_all(account, now)?)
            }
            Step::FundReserve { account, amount } => {
                let amount = Amount::from(*amount);
                self.ledger.fund_reserve(account, amount)?;
                Outcome::Funded {
                    amount,
                    reserve: self.ledger.reward_reserve(),
                }
            }
            Step::Advance { units } => {
                self.clock.advance(*units);
                Outcome::Advanced {
                    now: self.clock.now(),
                }
            }
            Step::Query { account } => Outcome::Snapshot(self.snapshot(account)?),
        };
        Ok(outcome)
    }

    fn step(&mut self, index: usize, step: &Step) -> StepReport {
        let now = self.clock.now();
        if let Some(account) = step.account() {
            if account != self.ledger.staking_account() {
                self.accounts.insert(account.clone());
            }
        }

        let outcome = match self.execute(step, now) {
            Ok(outcome) => {
                tracing::debug!(index, action = step.name(), %now, "step applied");
                outcome
            }
            Err(e) => {
                tracing::warn!(index, action = step.name(), %now, error = %e, "step failed");
                Outcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        // A rejected transaction still lands in its block.
        if step.is_transaction() {
            self.clock.advance(self.auto_advance);
        }

        StepReport {
            index,
            action: step.name(),
            time: now,
            outcome,
        }
    }
}

/// Run every step of `scenario` against a fresh in-memory token ledger.
///
/// Failed steps are recorded in the report and leave the ledger unchanged;
/// the run continues with the next step.
pub fn run(scenario: &Scenario) -> anyhow::Result<Report> {
    let mut runner = Runner::new(scenario)?;
    let start_time = runner.clock.now();

    let steps: Vec<StepReport> = scenario
        .steps
        .iter()
        .enumerate()
        .map(|(index, step)| runner.step(index, step))
        .collect();
    let failures = steps
        .iter()
        .filter(|s| matches!(s.outcome, Outcome::Failed { .. }))
        .count();

    let staking_account = runner.ledger.staking_account().clone();
    let accounts = runner
        .accounts
        .iter()
        .filter(|a| **a != staking_account)
        .map(|a| match runner.snapshot(a) {
            Ok(snap) => AccountState::Snapshot(snap),
            Err(e) => {
                tracing::warn!(account = %a, error = %e, "final snapshot failed");
                AccountState::Failed {
                    account: a.clone(),
                    error: e.to_string(),
                }
            }
        })
        .collect::<Vec<_>>();

    let report = Report {
        staking_account,
        start_time,
        end_time: runner.clock.now(),
        reward_reserve: runner.ledger.reward_reserve(),
        total_principal: runner.ledger.total_principal(),
        failures,
        steps,
        accounts,
    };
    tracing::info!(
        steps = report.steps.len(),
        failures,
        reserve = report.reward_reserve,
        "scenario finished"
    );
    Ok(report)
}
