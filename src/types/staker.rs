//! Staker Types

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use uuid::Uuid;

use crate::types::pool::now_secs;

/// Handle to one staker record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StakerId(Uuid);

impl StakerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for StakerId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for StakerId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for StakerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stk_{}", self.0.simple())
    }
}

/// An active depositor's position. Every field is fixed at deposit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakerDetail {
    pub id: StakerId,
    pub pool_id: Pubkey,
    pub owner: Pubkey,
    /// Principal contributed
    pub deposited: u64,
    /// Shares issued for the principal
    pub shares: u64,
    pub created_at: u64,
}

impl StakerDetail {
    pub fn new(pool_id: Pubkey, owner: Pubkey, deposited: u64, shares: u64) -> Self {
        Self {
            id: StakerId::new(),
            pool_id,
            owner,
            deposited,
            shares,
            created_at: now_secs(),
        }
    }

    pub fn is_owned_by(&self, caller: &Pubkey) -> bool {
        self.owner == *caller
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staker_ids_are_unique() {
        let a = StakerId::new();
        let b = StakerId::new();
        assert_ne!(a, b);
        assert!(a.to_string().starts_with("stk_"));
    }

    #[test]
    fn test_ownership() {
        let owner = Pubkey::new_unique();
        let staker = StakerDetail::new(Pubkey::new_unique(), owner, 10, 10);
        assert!(staker.is_owned_by(&owner));
        assert!(!staker.is_owned_by(&Pubkey::new_unique()));
    }
}
