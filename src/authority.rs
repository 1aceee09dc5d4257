//! Vault Authority
//!
//! The identity that controls a pool's vault is a program-derived address:
//! `find_program_address([VAULT_AUTHORITY_SEED, pool_id], program_id)`.
//!
//! Derived addresses lie off the ed25519 curve, so no private key exists for
//! them. Nothing secret is stored. Whoever holds the pool id can recompute the
//! authority, and the transfer boundary accepts the recomputation as proof.
//! What prevents substituting an unrelated vault is the owner check made when
//! the pool is initialized.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// Domain separator for vault authority derivation
pub const VAULT_AUTHORITY_SEED: &[u8] = b"vault_authority";

/// Keyless signing identity for one pool's vault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultAuthority {
    pub pool_id: Pubkey,
    pub address: Pubkey,
    pub bump: u8,
}

impl VaultAuthority {
    /// Derive the authority for `pool_id` under `program_id`
    pub fn derive(pool_id: &Pubkey, program_id: &Pubkey) -> Self {
        let (address, bump) =
            Pubkey::find_program_address(&[VAULT_AUTHORITY_SEED, pool_id.as_ref()], program_id);

        Self {
            pool_id: *pool_id,
            address,
            bump,
        }
    }

    /// Rebuild from a stored bump, returning `None` if the bump does not
    /// produce a valid derived address
    pub fn from_bump(pool_id: &Pubkey, bump: u8, program_id: &Pubkey) -> Option<Self> {
        Pubkey::create_program_address(
            &[VAULT_AUTHORITY_SEED, pool_id.as_ref(), &[bump]],
            program_id,
        )
        .ok()
        .map(|address| Self {
            pool_id: *pool_id,
            address,
            bump,
        })
    }

    /// Check that this authority really is the derivation for its pool
    pub fn verify(&self, program_id: &Pubkey) -> bool {
        Self::from_bump(&self.pool_id, self.bump, program_id)
            .map(|derived| derived.address == self.address)
            .unwrap_or(false)
    }
}

impl std::fmt::Display for VaultAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.address)
    }
}
