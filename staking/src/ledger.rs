//! The staking ledger: stake, claim and unstake against a fungible token.

use crate::accrual::{self, RewardRate};
use crate::config::StakingConfig;
use crate::entry::{DepositEntry, DepositQueue};
use crate::error::StakingError;
use crate::info::StakingInfo;
use crate::receipt::{ClaimAllocation, ClaimReceipt, StakeReceipt, UnstakeReceipt};
use crate::store::DepositStore;
use rider_store::StakingStore;
use rider_token::FungibleLedger;
use rider_types::{AccountId, Amount, Timestamp};

const LATEST_TIME_KEY: &[u8] = b"latest_time";

/// Orchestrates deposit entries, reward accrual and token movements.
///
/// The staking account in the token ledger holds every user's principal plus
/// the reward reserve. Reward is only ever paid out of the reserve:
/// `reserve = balance(staking_account) − Σ live principal`.
///
/// Every mutating call is all-or-nothing. A stake is range-checked before
/// its transfer and appended after it. Claims and unstakes stage a new copy
/// of only the entries they touch, issue the token movement, and commit the
/// staged head only when the movement succeeded.
#[derive(Clone)]
pub struct StakingLedger<L> {
    config: StakingConfig,
    token: L,
    deposits: DepositStore,
    /// Latest time-unit at which a mutation was applied.
    latest: Timestamp,
}

impl<L: FungibleLedger> StakingLedger<L> {
    pub fn new(config: StakingConfig, token: L) -> Result<Self, StakingError> {
        config.validate()?;
        Ok(Self {
            config,
            token,
            deposits: DepositStore::new(),
            latest: Timestamp::EPOCH,
        })
    }

    pub fn config(&self) -> &StakingConfig {
        &self.config
    }

    pub fn staking_account(&self) -> &AccountId {
        &self.config.staking_account
    }

    pub fn reward_rate(&self) -> RewardRate {
        self.config.reward_rate
    }

    /// The underlying token ledger.
    pub fn token(&self) -> &L {
        &self.token
    }

    /// Mutable access to the token ledger, for setup such as minting and
    /// approvals. Moving the staking account's balance through this handle
    /// changes the reward reserve.
    pub fn token_mut(&mut self) -> &mut L {
        &mut self.token
    }

    /// Latest time-unit at which a mutation was applied.
    pub fn latest_time(&self) -> Timestamp {
        self.latest
    }

    fn check_amount(amount: Amount) -> Result<(), StakingError> {
        if amount == 0 {
            return Err(StakingError::InvalidAmount);
        }
        Ok(())
    }

    fn check_user(&self, user: &AccountId) -> Result<(), StakingError> {
        if !user.is_valid() {
            return Err(StakingError::InvalidAccount(format!(
                "{:?} is not a valid account id",
                user.as_str()
            )));
        }
        if user == self.staking_account() {
            return Err(StakingError::InvalidAccount(format!(
                "{user} is the staking account"
            )));
        }
        Ok(())
    }

    fn check_time(&self, now: Timestamp) -> Result<(), StakingError> {
        if now < self.latest {
            return Err(StakingError::InvalidTimestamp {
                now,
                latest: self.latest,
            });
        }
        Ok(())
    }

    fn check_reserve(&self, reward: Amount) -> Result<(), StakingError> {
        let available = self.reward_reserve();
        if reward > available {
            return Err(StakingError::InsufficientReserve {
                needed: reward,
                available,
            });
        }
        Ok(())
    }

    /// Deposit `amount` from `user` as a new entry at the tail of its queue.
    ///
    /// `user` must have approved the staking account to move `amount`.
    /// Token failures (`InsufficientBalance`, `InsufficientAllowance`) are
    /// returned unchanged inside [`StakingError::Token`].
    pub fn stake(
        &mut self,
        user: &AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<StakeReceipt, StakingError> {
        Self::check_amount(amount)?;
        self.check_user(user)?;
        self.check_time(now)?;

        self.deposits.check_append(user, amount)?;

        let staking = self.config.staking_account.clone();
        if let Err(e) = self.token.transfer_from(&staking, user, &staking, amount) {
            tracing::warn!(user = %user, amount, error = %e, "stake rejected by token ledger");
            return Err(e.into());
        }
        let entry_index = self.deposits.append(user, amount, now);
        self.latest = now;

        tracing::debug!(user = %user, amount, entry_index, %now, "stake recorded");
        Ok(StakeReceipt {
            entry_index,
            principal: amount,
            checkpoint: now,
        })
    }

    /// Pay `amount` of accrued reward to `user`, drawing it down from the
    /// oldest entries first. Principal is untouched and no entry is removed.
    pub fn claim(
        &mut self,
        user: &AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<ClaimReceipt, StakingError> {
        Self::check_amount(amount)?;
        self.check_user(user)?;
        self.check_time(now)?;

        let rate = self.config.reward_rate;
        let available = self.deposits.total_claimable(user, now, rate)?;
        if amount > available {
            tracing::warn!(user = %user, amount, available, "claim exceeds claimable reward");
            return Err(StakingError::ExceedsClaimable {
                requested: amount,
                available,
            });
        }
        self.check_reserve(amount)?;

        let (head, allocations) =
            draw_down_reward(self.deposits.for_each_fifo(user), amount, now, rate)?;
        let staged = self.deposits.stage(user, head.len(), head)?;

        let staking = self.config.staking_account.clone();
        self.token.transfer(&staking, user, amount)?;
        self.deposits.commit(staged);
        self.latest = now;

        tracing::debug!(
            user = %user,
            amount,
            entries = allocations.len(),
            %now,
            "reward claimed"
        );
        Ok(ClaimReceipt {
            amount,
            allocations,
        })
    }

    /// Claim every unit of reward `user` can claim at `now`.
    pub fn claim_all(
        &mut self,
        user: &AccountId,
        now: Timestamp,
    ) -> Result<ClaimReceipt, StakingError> {
        let amount = self.total_claimable(user, now)?;
        self.claim(user, amount, now)
    }

    /// Withdraw `amount` of principal, oldest entries first.
    ///
    /// Every touched entry has its whole outstanding reward settled. An entry
    /// left with principal restarts accrual at `now`; an emptied entry is
    /// removed. Principal and settled reward leave in one transfer.
    pub fn unstake(
        &mut self,
        user: &AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<UnstakeReceipt, StakingError> {
        Self::check_amount(amount)?;
        self.check_user(user)?;
        self.check_time(now)?;

        let rate = self.config.reward_rate;
        let available = self.deposits.total_principal(user);
        if amount > available {
            tracing::warn!(user = %user, amount, available, "unstake exceeds staked principal");
            return Err(StakingError::InsufficientPrincipal {
                requested: amount,
                available,
            });
        }

        let (mut head, reward) =
            withdraw_principal(self.deposits.for_each_fifo(user), amount, now, rate)?;
        let touched = head.len();
        let entries_removed = head.remove_emptied();
        self.check_reserve(reward)?;
        let payout = amount
            .checked_add(reward)
            .ok_or(StakingError::ArithmeticOverflow)?;
        let staged = self.deposits.stage(user, touched, head)?;

        let staking = self.config.staking_account.clone();
        self.token.transfer(&staking, user, payout)?;
        self.deposits.commit(staged);
        self.latest = now;

        tracing::debug!(
            user = %user,
            principal = amount,
            reward,
            entries_removed,
            %now,
            "principal unstaked"
        );
        Ok(UnstakeReceipt {
            principal: amount,
            reward,
            payout,
            entries_removed,
        })
    }

    /// Withdraw all of `user`'s principal and settle all of its reward.
    pub fn unstake_all(
        &mut self,
        user: &AccountId,
        now: Timestamp,
    ) -> Result<UnstakeReceipt, StakingError> {
        let amount = self.total_staked(user);
        self.unstake(user, amount, now)
    }

    /// Top up the reward reserve with `amount` from `funder`.
    ///
    /// `funder` must have approved the staking account to move `amount`.
    pub fn fund_reserve(&mut self, funder: &AccountId, amount: Amount) -> Result<(), StakingError> {
        Self::check_amount(amount)?;
        self.check_user(funder)?;
        let staking = self.config.staking_account.clone();
        self.token.transfer_from(&staking, funder, &staking, amount)?;
        tracing::debug!(funder = %funder, amount, "reward reserve funded");
        Ok(())
    }

    /// Tokens in the staking account that are not anyone's principal.
    pub fn reward_reserve(&self) -> Amount {
        self.token
            .balance_of(self.staking_account())
            .saturating_sub(self.deposits.locked())
    }

    /// `user`'s live entries as parallel arrays, oldest first.
    pub fn staking_info(&self, user: &AccountId) -> StakingInfo {
        self.deposits
            .queue(user)
            .map(StakingInfo::from_queue)
            .unwrap_or_default()
    }

    /// Reward `user` could claim at `now`. Recomputed on every call.
    pub fn total_claimable(&self, user: &AccountId, now: Timestamp) -> Result<Amount, StakingError> {
        self.deposits
            .total_claimable(user, now, self.config.reward_rate)
    }

    /// `user`'s live principal.
    pub fn total_staked(&self, user: &AccountId) -> Amount {
        self.deposits.total_principal(user)
    }

    /// Live principal across all users.
    pub fn total_principal(&self) -> Amount {
        self.deposits.locked()
    }

    /// `user`'s live entries, oldest first.
    pub fn entries(&self, user: &AccountId) -> &[DepositEntry] {
        self.deposits
            .queue(user)
            .map(DepositQueue::as_slice)
            .unwrap_or(&[])
    }

    /// Number of users with at least one live entry.
    pub fn staker_count(&self) -> usize {
        self.deposits.account_count()
    }
}

impl<L: FungibleLedger> StakingLedger<L> {
    /// Persist every deposit queue and the latest mutation time.
    ///
    /// Users whose queue emptied since the last save are deleted from the store.
    pub fn save_to_store(&self, store: &dyn StakingStore) -> Result<(), StakingError> {
        store.put_meta(LATEST_TIME_KEY, &self.latest.as_units().to_be_bytes())?;

        for (account, queue) in self.deposits.iter() {
            let bytes =
                bincode::serialize(queue).map_err(|e| StakingError::Serialization(e.to_string()))?;
            store.put_deposits(account, &bytes)?;
        }
        for (account, _) in store.iter_deposits()? {
            if self.deposits.queue(&account).is_none() {
                store.delete_deposits(&account)?;
            }
        }
        Ok(())
    }

    /// Restore a ledger from a store, wired to `token` for future movements.
    pub fn load_from_store(
        config: StakingConfig,
        token: L,
        store: &dyn StakingStore,
    ) -> Result<Self, StakingError> {
        let mut ledger = Self::new(config, token)?;

        if let Some(bytes) = store.get_meta(LATEST_TIME_KEY)? {
            let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                StakingError::Serialization(format!(
                    "latest time must be 8 bytes, found {}",
                    bytes.len()
                ))
            })?;
            ledger.latest = Timestamp::new(u64::from_be_bytes(raw));
        }

        for (account, bytes) in store.iter_deposits()? {
            let queue: DepositQueue = bincode::deserialize(&bytes)
                .map_err(|e| StakingError::Serialization(e.to_string()))?;
            ledger.deposits.restore(&account, queue)?;
        }

        tracing::debug!(
            stakers = ledger.staker_count(),
            locked = ledger.total_principal(),
            "staking ledger restored"
        );
        Ok(ledger)
    }
}

/// Increase `claimed` on entries oldest-first until `amount` is allocated.
///
/// Returns the touched prefix of the queue with its new `claimed` values,
/// ready to replace the same number of entries at the front. The caller has
/// already checked `amount` against the total claimable reward.
fn draw_down_reward<'a>(
    fifo: impl Iterator<Item = &'a DepositEntry>,
    amount: Amount,
    now: Timestamp,
    rate: RewardRate,
) -> Result<(DepositQueue, Vec<ClaimAllocation>), StakingError> {
    let mut remaining = amount;
    let mut head = DepositQueue::new();
    let mut allocations = Vec::new();
    for (entry_index, entry) in fifo.enumerate() {
        if remaining == 0 {
            break;
        }
        let mut entry = entry.clone();
        let take = accrual::claimable(&entry, now, rate)?.min(remaining);
        if take > 0 {
            entry.claimed = entry
                .claimed
                .checked_add(take)
                .ok_or(StakingError::ArithmeticOverflow)?;
            remaining -= take;
            allocations.push(ClaimAllocation {
                entry_index,
                amount: take,
            });
        }
        head.push(entry);
    }
    debug_assert_eq!(remaining, 0, "claim exceeded claimable reward");
    Ok((head, allocations))
}

/// Remove `amount` of principal oldest-first, settling the full outstanding
/// reward of every touched entry.
///
/// Returns the touched prefix and the settled reward. Emptied entries are
/// left in the prefix with zero principal for the caller to drop.
fn withdraw_principal<'a>(
    fifo: impl Iterator<Item = &'a DepositEntry>,
    amount: Amount,
    now: Timestamp,
    rate: RewardRate,
) -> Result<(DepositQueue, Amount), StakingError> {
    let mut remaining = amount;
    let mut reward: Amount = 0;
    let mut head = DepositQueue::new();
    for entry in fifo {
        if remaining == 0 {
            break;
        }
        let mut entry = entry.clone();
        let take = entry.principal.min(remaining);
        let settled = accrual::claimable(&entry, now, rate)?;
        reward = reward
            .checked_add(settled)
            .ok_or(StakingError::ArithmeticOverflow)?;
        entry.principal -= take;
        remaining -= take;
        if !entry.is_emptied() {
            entry.restart(now);
        }
        head.push(entry);
    }
    debug_assert_eq!(remaining, 0, "unstake exceeded staked principal");
    Ok((head, reward))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rider_nullables::NullStakingStore;
    use rider_token::{MemoryLedger, TokenError};

    fn user() -> AccountId {
        AccountId::new("owner")
    }

    fn t(units: u64) -> Timestamp {
        Timestamp::new(units)
    }

    /// Ledger with `owner` holding 10_000 and a 1_000_000 reward reserve.
    fn make_ledger() -> StakingLedger<MemoryLedger> {
        let config = StakingConfig::default();
        let mut token = MemoryLedger::new();
        token.mint(&user(), 10_000).unwrap();
        token.mint(&config.staking_account, 1_000_000).unwrap();
        StakingLedger::new(config, token).unwrap()
    }

    fn approve(ledger: &mut StakingLedger<MemoryLedger>, owner: &AccountId, amount: Amount) {
        let staking = ledger.staking_account().clone();
        ledger.token_mut().approve(owner, &staking, amount).unwrap();
    }

    fn stake(ledger: &mut StakingLedger<MemoryLedger>, amount: Amount, now: u64) {
        approve(ledger, &user(), amount);
        ledger.stake(&user(), amount, t(now)).unwrap();
    }

    #[test]
    fn stake_appends_entry_and_pulls_tokens() {
        let mut ledger = make_ledger();
        approve(&mut ledger, &user(), 100);
        let receipt = ledger.stake(&user(), 100, t(5)).unwrap();
        assert_eq!(receipt.entry_index, 0);
        assert_eq!(receipt.checkpoint, t(5));
        assert_eq!(ledger.token().balance_of(&user()), 9_900);
        assert_eq!(ledger.total_principal(), 100);
        assert_eq!(ledger.entries(&user()), &[DepositEntry::new(100, t(5))]);
        assert_eq!(ledger.total_claimable(&user(), t(5)).unwrap(), 0);
    }

    #[test]
    fn stake_zero_is_invalid() {
        let mut ledger = make_ledger();
        assert!(matches!(
            ledger.stake(&user(), 0, t(1)),
            Err(StakingError::InvalidAmount)
        ));
    }

    #[test]
    fn stake_without_allowance_propagates_token_error() {
        let mut ledger = make_ledger();
        let err = ledger.stake(&user(), 100, t(1)).unwrap_err();
        assert!(matches!(
            err,
            StakingError::Token(TokenError::InsufficientAllowance {
                needed: 100,
                available: 0
            })
        ));
        assert!(ledger.entries(&user()).is_empty());
        assert_eq!(ledger.token().balance_of(&user()), 10_000);
        assert_eq!(ledger.latest_time(), Timestamp::EPOCH);
    }

    #[test]
    fn stake_beyond_balance_propagates_token_error() {
        let mut ledger = make_ledger();
        approve(&mut ledger, &user(), 20_000);
        let err = ledger.stake(&user(), 20_000, t(1)).unwrap_err();
        assert!(matches!(
            err,
            StakingError::Token(TokenError::InsufficientBalance { .. })
        ));
        assert_eq!(ledger.total_principal(), 0);
    }

    #[test]
    fn staking_account_cannot_stake() {
        let mut ledger = make_ledger();
        let staking = ledger.staking_account().clone();
        assert!(matches!(
            ledger.stake(&staking, 10, t(1)),
            Err(StakingError::InvalidAccount(_))
        ));
    }

    #[test]
    fn claim_draws_oldest_entry_first() {
        let mut ledger = make_ledger();
        stake(&mut ledger, 100, 0);
        stake(&mut ledger, 100, 2);
        // t=3: entry0 accrued 300, entry1 accrued 100.
        let receipt = ledger.claim(&user(), 350, t(3)).unwrap();
        assert_eq!(
            receipt.allocations,
            vec![
                ClaimAllocation {
                    entry_index: 0,
                    amount: 300
                },
                ClaimAllocation {
                    entry_index: 1,
                    amount: 50
                },
            ]
        );
        let info = ledger.staking_info(&user());
        assert_eq!(info.principals, vec![100, 100]);
        assert_eq!(info.claimed, vec![300, 50]);
        assert_eq!(ledger.total_claimable(&user(), t(3)).unwrap(), 50);
    }

    #[test]
    fn claim_more_than_claimable_fails_without_change() {
        let mut ledger = make_ledger();
        stake(&mut ledger, 100, 0);
        let before = ledger.token().balance_of(&user());
        let err = ledger.claim(&user(), 101, t(1)).unwrap_err();
        assert!(matches!(
            err,
            StakingError::ExceedsClaimable {
                requested: 101,
                available: 100
            }
        ));
        assert_eq!(ledger.staking_info(&user()).claimed, vec![0]);
        assert_eq!(ledger.token().balance_of(&user()), before);
    }

    #[test]
    fn claim_all_empties_claimable() {
        let mut ledger = make_ledger();
        stake(&mut ledger, 40, 0);
        let receipt = ledger.claim_all(&user(), t(10)).unwrap();
        assert_eq!(receipt.amount, 400);
        assert_eq!(ledger.total_claimable(&user(), t(10)).unwrap(), 0);
        assert!(matches!(
            ledger.claim_all(&user(), t(10)),
            Err(StakingError::InvalidAmount)
        ));
    }

    #[test]
    fn partial_unstake_restarts_survivor() {
        let mut ledger = make_ledger();
        stake(&mut ledger, 100, 0);
        ledger.claim(&user(), 30, t(1)).unwrap();
        let receipt = ledger.unstake(&user(), 40, t(4)).unwrap();
        // accrued 400, claimed 30 → 370 settled.
        assert_eq!(receipt.reward, 370);
        assert_eq!(receipt.payout, 410);
        assert_eq!(receipt.entries_removed, 0);
        assert_eq!(
            ledger.entries(&user()),
            &[DepositEntry {
                principal: 60,
                claimed: 0,
                checkpoint: t(4)
            }]
        );
        assert_eq!(ledger.total_claimable(&user(), t(5)).unwrap(), 60);
    }

    #[test]
    fn unstake_spanning_entries_settles_each_touched_entry() {
        let mut ledger = make_ledger();
        stake(&mut ledger, 100, 0);
        stake(&mut ledger, 100, 1);
        stake(&mut ledger, 100, 2);
        // t=3: rewards 300, 200, 100. Unstake 150 touches the first two only.
        let receipt = ledger.unstake(&user(), 150, t(3)).unwrap();
        assert_eq!(receipt.reward, 500);
        assert_eq!(receipt.entries_removed, 1);
        let info = ledger.staking_info(&user());
        assert_eq!(info.principals, vec![50, 100]);
        assert_eq!(info.claimed, vec![0, 0]);
        assert_eq!(info.checkpoints, vec![t(3), t(2)]);
        assert_eq!(ledger.total_principal(), 150);
    }

    #[test]
    fn long_queue_is_only_touched_at_the_head() {
        let mut ledger = make_ledger();
        approve(&mut ledger, &user(), 5_000);
        for i in 0..5_000u64 {
            let receipt = ledger.stake(&user(), 1, t(i)).unwrap();
            assert_eq!(receipt.entry_index, i as usize);
        }
        assert_eq!(ledger.total_staked(&user()), 5_000);
        assert_eq!(ledger.total_principal(), 5_000);

        let receipt = ledger.unstake(&user(), 2, t(5_000)).unwrap();
        assert_eq!(receipt.entries_removed, 2);
        // Rewards for the entries staked at t=0 and t=1.
        assert_eq!(receipt.reward, 5_000 + 4_999);
        let entries = ledger.entries(&user());
        assert_eq!(entries.len(), 4_998);
        assert_eq!(entries[0], DepositEntry::new(1, t(2)));
        assert_eq!(entries[4_997], DepositEntry::new(1, t(4_999)));
        assert_eq!(ledger.total_staked(&user()), 4_998);

        ledger.claim(&user(), 4_998, t(5_000)).unwrap();
        let claimed = ledger.staking_info(&user()).claimed;
        assert_eq!(claimed[0], 4_998);
        assert_eq!(claimed[1], 0);
    }

    #[test]
    fn unstake_more_than_principal_fails() {
        let mut ledger = make_ledger();
        stake(&mut ledger, 100, 0);
        let err = ledger.unstake(&user(), 101, t(1)).unwrap_err();
        assert!(matches!(
            err,
            StakingError::InsufficientPrincipal {
                requested: 101,
                available: 100
            }
        ));
        assert_eq!(ledger.total_staked(&user()), 100);
    }

    #[test]
    fn unstake_all_removes_every_entry() {
        let mut ledger = make_ledger();
        stake(&mut ledger, 10, 0);
        stake(&mut ledger, 20, 0);
        let receipt = ledger.unstake_all(&user(), t(2)).unwrap();
        assert_eq!(receipt.principal, 30);
        assert_eq!(receipt.reward, 60);
        assert_eq!(receipt.entries_removed, 2);
        assert!(ledger.staking_info(&user()).is_empty());
        assert_eq!(ledger.staker_count(), 0);
        assert_eq!(ledger.token().balance_of(&user()), 10_060);
    }

    #[test]
    fn reward_never_comes_from_principal() {
        let config = StakingConfig::default();
        let mut token = MemoryLedger::new();
        token.mint(&user(), 1_000).unwrap();
        let mut ledger = StakingLedger::new(config, token).unwrap();
        stake(&mut ledger, 500, 0);
        assert_eq!(ledger.reward_reserve(), 0);

        let err = ledger.claim(&user(), 1, t(1)).unwrap_err();
        assert!(matches!(
            err,
            StakingError::InsufficientReserve {
                needed: 1,
                available: 0
            }
        ));
        let err = ledger.unstake(&user(), 500, t(1)).unwrap_err();
        assert!(matches!(err, StakingError::InsufficientReserve { needed: 500, .. }));
        assert_eq!(ledger.total_staked(&user()), 500);
        assert_eq!(ledger.staking_info(&user()).claimed, vec![0]);
    }

    #[test]
    fn fractional_rate_floors_each_entry() {
        let config = StakingConfig {
            reward_rate: RewardRate::new(1, 3).unwrap(),
            ..StakingConfig::default()
        };
        let mut token = MemoryLedger::new();
        token.mint(&user(), 10_000).unwrap();
        token.mint(&config.staking_account, 1_000_000).unwrap();
        let mut ledger = StakingLedger::new(config, token).unwrap();
        stake(&mut ledger, 100, 0);
        stake(&mut ledger, 100, 1);

        // t=2: floor(200/3) + floor(100/3).
        assert_eq!(ledger.total_claimable(&user(), t(2)).unwrap(), 99);
        let receipt = ledger.claim(&user(), 70, t(2)).unwrap();
        assert_eq!(
            receipt.allocations,
            vec![
                ClaimAllocation {
                    entry_index: 0,
                    amount: 66
                },
                ClaimAllocation {
                    entry_index: 1,
                    amount: 4
                },
            ]
        );
        ledger.claim_all(&user(), t(2)).unwrap();
        assert_eq!(ledger.staking_info(&user()).claimed, vec![66, 33]);

        // t=5: 166 - 66 and 133 - 33.
        let receipt = ledger.unstake(&user(), 150, t(5)).unwrap();
        assert_eq!(receipt.reward, 200);
        assert_eq!(receipt.entries_removed, 1);
        assert_eq!(
            ledger.entries(&user()),
            &[DepositEntry {
                principal: 50,
                claimed: 0,
                checkpoint: t(5)
            }]
        );
        assert_eq!(ledger.total_claimable(&user(), t(8)).unwrap(), 50);
        assert_eq!(ledger.token().balance_of(&user()), 10_249);
    }

    #[test]
    fn overflowing_accrual_leaves_ledger_untouched() {
        let whale = AccountId::new("whale");
        let mut ledger = make_ledger();
        ledger.token_mut().mint(&whale, 1 << 127).unwrap();
        approve(&mut ledger, &whale, 1 << 127);
        ledger.stake(&whale, 1 << 127, t(0)).unwrap();

        let entries = ledger.entries(&whale).to_vec();
        let staking = ledger.staking_account().clone();
        let staking_balance = ledger.token().balance_of(&staking);
        let reserve = ledger.reward_reserve();

        // principal * 2 no longer fits in 128 bits.
        assert!(matches!(
            ledger.claim(&whale, 1, t(2)),
            Err(StakingError::ArithmeticOverflow)
        ));
        assert!(matches!(
            ledger.unstake(&whale, 1, t(2)),
            Err(StakingError::ArithmeticOverflow)
        ));
        assert!(matches!(
            ledger.total_claimable(&whale, t(2)),
            Err(StakingError::ArithmeticOverflow)
        ));

        assert_eq!(ledger.entries(&whale), entries.as_slice());
        assert_eq!(ledger.latest_time(), t(0));
        assert_eq!(ledger.token().balance_of(&whale), 0);
        assert_eq!(ledger.token().balance_of(&staking), staking_balance);
        assert_eq!(ledger.reward_reserve(), reserve);
        assert_eq!(ledger.total_staked(&whale), 1 << 127);
    }

    #[test]
    fn fund_reserve_pulls_from_funder() {
        let config = StakingConfig::default();
        let funder = AccountId::new("treasury");
        let mut token = MemoryLedger::new();
        token.mint(&funder, 5_000).unwrap();
        let mut ledger = StakingLedger::new(config, token).unwrap();
        approve(&mut ledger, &funder, 5_000);
        ledger.fund_reserve(&funder, 2_000).unwrap();
        assert_eq!(ledger.reward_reserve(), 2_000);
        assert_eq!(ledger.token().balance_of(&funder), 3_000);
    }

    #[test]
    fn mutation_in_the_past_is_rejected() {
        let mut ledger = make_ledger();
        stake(&mut ledger, 100, 10);
        approve(&mut ledger, &user(), 100);
        let err = ledger.stake(&user(), 100, t(9)).unwrap_err();
        assert!(matches!(
            err,
            StakingError::InvalidTimestamp { now, latest } if now == t(9) && latest == t(10)
        ));
        assert!(matches!(
            ledger.claim(&user(), 1, t(9)),
            Err(StakingError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn queries_are_idempotent() {
        let mut ledger = make_ledger();
        stake(&mut ledger, 70, 0);
        stake(&mut ledger, 30, 4);
        ledger.claim(&user(), 100, t(5)).unwrap();
        assert_eq!(ledger.staking_info(&user()), ledger.staking_info(&user()));
        assert_eq!(
            ledger.total_claimable(&user(), t(8)).unwrap(),
            ledger.total_claimable(&user(), t(8)).unwrap()
        );
    }

    #[test]
    fn save_and_load_round_trip() {
        let store = NullStakingStore::new();
        let mut ledger = make_ledger();
        stake(&mut ledger, 100, 0);
        stake(&mut ledger, 50, 3);
        ledger.claim(&user(), 120, t(4)).unwrap();
        ledger.save_to_store(&store).unwrap();

        let token = ledger.token().clone();
        let restored =
            StakingLedger::load_from_store(StakingConfig::default(), token, &store).unwrap();
        assert_eq!(restored.staking_info(&user()), ledger.staking_info(&user()));
        assert_eq!(restored.total_principal(), 150);
        assert_eq!(restored.latest_time(), t(4));
        assert_eq!(restored.reward_reserve(), ledger.reward_reserve());
    }

    #[test]
    fn save_deletes_emptied_users() {
        let store = NullStakingStore::new();
        let mut ledger = make_ledger();
        stake(&mut ledger, 100, 0);
        ledger.save_to_store(&store).unwrap();
        assert_eq!(store.iter_deposits().unwrap().len(), 1);

        ledger.unstake_all(&user(), t(1)).unwrap();
        ledger.save_to_store(&store).unwrap();
        assert!(store.iter_deposits().unwrap().is_empty());
    }

    #[test]
    fn load_rejects_malformed_time_meta() {
        let store = NullStakingStore::new();
        store.put_meta(LATEST_TIME_KEY, &[1, 2, 3]).unwrap();
        let result =
            StakingLedger::load_from_store(StakingConfig::default(), MemoryLedger::new(), &store);
        assert!(matches!(result, Err(StakingError::Serialization(_))));
    }
}
