//! Share Math
//!
//! Issuance and redemption are priced against the vault's current balance,
//! not against total principal. Intermediates are `u128`; results that do
//! not fit `u64` are errors, never saturated.

use crate::common::{Result, StakingError};

/// Shares to issue for a deposit of `amount`
///
/// `amount` when no shares exist, otherwise `floor(amount * total_shares / vault_balance)`.
pub fn shares_for_deposit(amount: u64, total_shares: u64, vault_balance: u64) -> Result<u64> {
    if total_shares == 0 {
        return Ok(amount);
    }

    if vault_balance == 0 {
        return Err(StakingError::ArithmeticOverflow(
            "share price undefined: vault empty with outstanding shares",
        ));
    }

    let shares = (amount as u128)
        .checked_mul(total_shares as u128)
        .ok_or(StakingError::ArithmeticOverflow("amount * total_shares"))?
        / vault_balance as u128;

    u64::try_from(shares).map_err(|_| StakingError::ArithmeticOverflow("shares exceed u64"))
}

/// Vault payout for redeeming `shares`: `floor(vault_balance * shares / total_shares)`
pub fn payout_for_shares(shares: u64, total_shares: u64, vault_balance: u64) -> Result<u64> {
    if shares > total_shares {
        return Err(StakingError::ArithmeticUnderflow(
            "position holds more shares than the pool",
        ));
    }

    if total_shares == 0 {
        return Ok(0);
    }

    let payout = (vault_balance as u128)
        .checked_mul(shares as u128)
        .ok_or(StakingError::ArithmeticOverflow("vault_balance * shares"))?
        / total_shares as u128;

    // shares <= total_shares, so payout <= vault_balance
    u64::try_from(payout).map_err(|_| StakingError::ArithmeticOverflow("payout exceeds u64"))
}

/// Pool counters after a change, computed before any funds move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    pub stakers_count: u8,
    pub total_staked: u64,
    pub total_shares: u64,
}

impl Counters {
    pub fn after_deposit(self, amount: u64, shares: u64) -> Result<Self> {
        Ok(Self {
            stakers_count: self
                .stakers_count
                .checked_add(1)
                .ok_or(StakingError::ArithmeticOverflow("stakers_count"))?,
            total_staked: self
                .total_staked
                .checked_add(amount)
                .ok_or(StakingError::ArithmeticOverflow("total_staked"))?,
            total_shares: self
                .total_shares
                .checked_add(shares)
                .ok_or(StakingError::ArithmeticOverflow("total_shares"))?,
        })
    }

    pub fn after_withdraw(self, deposited: u64, shares: u64) -> Result<Self> {
        Ok(Self {
            stakers_count: self
                .stakers_count
                .checked_sub(1)
                .ok_or(StakingError::ArithmeticUnderflow("stakers_count"))?,
            total_staked: self
                .total_staked
                .checked_sub(deposited)
                .ok_or(StakingError::ArithmeticUnderflow("total_staked"))?,
            total_shares: self
                .total_shares
                .checked_sub(shares)
                .ok_or(StakingError::ArithmeticUnderflow("total_shares"))?,
        })
    }
}
