//! Pool Types
//!
//! The per-pool aggregate and the read-only views built from it.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::types::staker::StakerDetail;

/// Pool aggregate: one per vault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    /// Address the pool occupies; the vault authority is derived from it
    pub pool_id: Pubkey,
    /// Token type held by the vault
    pub mint: Pubkey,
    /// External custody account
    pub vault: Pubkey,
    /// Identity that created the pool (administrative only)
    pub authority: Pubkey,
    /// Bump of the derived vault authority
    pub authority_bump: u8,
    /// Number of active staker records
    pub stakers_count: u8,
    /// Sum of active principal
    pub total_staked: u64,
    /// Sum of active shares
    pub total_shares: u64,
    /// Timestamp when the pool was created
    pub created_at: u64,
    /// Timestamp of last mutation
    pub updated_at: u64,
}

impl Pool {
    pub fn new(
        pool_id: Pubkey,
        mint: Pubkey,
        vault: Pubkey,
        authority: Pubkey,
        authority_bump: u8,
    ) -> Self {
        let now = now_secs();
        Self {
            pool_id,
            mint,
            vault,
            authority,
            authority_bump,
            stakers_count: 0,
            total_staked: 0,
            total_shares: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stakers_count == 0
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = now_secs();
    }
}

/// Point-in-time view of a pool and its vault
#[derive(Debug, Clone, Serialize)]
pub struct PoolSnapshot {
    pub pool: Pool,
    /// Vault balance read under the pool lock
    pub vault_balance: u64,
    pub stakers: Vec<StakerDetail>,
}

impl PoolSnapshot {
    /// Vault value of one share, scaled by `scale`; `None` when no shares exist
    pub fn value_per_share(&self, scale: u64) -> Option<u128> {
        if self.pool.total_shares == 0 {
            return None;
        }
        Some(self.vault_balance as u128 * scale as u128 / self.pool.total_shares as u128)
    }

    /// Vault holdings not backed by principal (yield or external top-ups)
    pub fn accrued(&self) -> i128 {
        self.vault_balance as i128 - self.pool.total_staked as i128
    }
}

pub(crate) fn now_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(vault_balance: u64, total_staked: u64, total_shares: u64) -> PoolSnapshot {
        let mut pool = Pool::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            255,
        );
        pool.total_staked = total_staked;
        pool.total_shares = total_shares;
        PoolSnapshot {
            pool,
            vault_balance,
            stakers: Vec::new(),
        }
    }

    #[test]
    fn test_new_pool_is_empty() {
        let pool = snapshot(0, 0, 0).pool;
        assert!(pool.is_empty());
        assert_eq!(pool.total_staked, 0);
        assert_eq!(pool.total_shares, 0);
        assert_eq!(pool.created_at, pool.updated_at);
    }

    #[test]
    fn test_value_per_share_after_top_up() {
        let snap = snapshot(300, 150, 150);
        assert_eq!(snap.value_per_share(1_000), Some(2_000));
        assert_eq!(snap.accrued(), 150);

        assert_eq!(snapshot(0, 0, 0).value_per_share(1_000), None);
    }
}
