//! Caller Identity Verification
//!
//! Every state-mutating call carries an [`OwnerProof`]: an ed25519 signature by
//! the claimed identity over the digest of the exact operation being requested.

use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};

use crate::types::StakerId;

/// Domain prefix for operation digests
const INTENT_DOMAIN: &[u8] = b"stakepool:intent:v1";

/// An operation a caller asks to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Initialize {
        pool: Pubkey,
        mint: Pubkey,
        vault: Pubkey,
    },
    Deposit {
        pool: Pubkey,
        amount: u64,
        funding: Pubkey,
    },
    Withdraw {
        pool: Pubkey,
        staker: StakerId,
        destination: Pubkey,
    },
}

impl Intent {
    /// SHA-256 digest the caller signs
    pub fn message(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(INTENT_DOMAIN);

        match self {
            Intent::Initialize { pool, mint, vault } => {
                hasher.update([0u8]);
                hasher.update(pool.as_ref());
                hasher.update(mint.as_ref());
                hasher.update(vault.as_ref());
            }
            Intent::Deposit {
                pool,
                amount,
                funding,
            } => {
                hasher.update([1u8]);
                hasher.update(pool.as_ref());
                hasher.update(amount.to_le_bytes());
                hasher.update(funding.as_ref());
            }
            Intent::Withdraw {
                pool,
                staker,
                destination,
            } => {
                hasher.update([2u8]);
                hasher.update(pool.as_ref());
                hasher.update(staker.as_uuid().as_bytes());
                hasher.update(destination.as_ref());
            }
        }

        hasher.finalize().into()
    }
}

/// Signature by `signer` over an intent digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerProof {
    pub signer: Pubkey,
    pub signature: Signature,
}

impl OwnerProof {
    pub fn sign(keypair: &Keypair, intent: &Intent) -> Self {
        Self {
            signer: keypair.pubkey(),
            signature: keypair.sign_message(&intent.message()),
        }
    }
}

/// Confirms a caller controls the identity it claims
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, claimed: &Pubkey, proof: &OwnerProof, intent: &Intent)
        -> Result<(), IdentityError>;
}

/// Ed25519 signature verifier
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureVerifier;

impl IdentityVerifier for SignatureVerifier {
    fn verify(
        &self,
        claimed: &Pubkey,
        proof: &OwnerProof,
        intent: &Intent,
    ) -> Result<(), IdentityError> {
        if proof.signer != *claimed {
            return Err(IdentityError::SignerMismatch {
                claimed: *claimed,
                signer: proof.signer,
            });
        }

        if !proof
            .signature
            .verify(claimed.as_ref(), &intent.message())
        {
            return Err(IdentityError::InvalidSignature(*claimed));
        }

        Ok(())
    }
}

/// Identity verification errors
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("proof signed by {signer}, caller claims {claimed}")]
    SignerMismatch { claimed: Pubkey, signer: Pubkey },

    #[error("signature does not verify for {0}")]
    InvalidSignature(Pubkey),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deposit_intent(amount: u64) -> Intent {
        Intent::Deposit {
            pool: Pubkey::new_from_array([1; 32]),
            amount,
            funding: Pubkey::new_from_array([2; 32]),
        }
    }

    #[test]
    fn test_valid_signature() {
        let keypair = Keypair::new();
        let intent = deposit_intent(10);
        let proof = OwnerProof::sign(&keypair, &intent);

        assert!(SignatureVerifier
            .verify(&keypair.pubkey(), &proof, &intent)
            .is_ok());
    }

    #[test]
    fn test_proof_bound_to_intent() {
        let keypair = Keypair::new();
        let proof = OwnerProof::sign(&keypair, &deposit_intent(10));

        let result = SignatureVerifier.verify(&keypair.pubkey(), &proof, &deposit_intent(11));
        assert!(matches!(result, Err(IdentityError::InvalidSignature(_))));
    }

    #[test]
    fn test_claimed_identity_must_sign() {
        let keypair = Keypair::new();
        let intent = deposit_intent(10);
        let proof = OwnerProof::sign(&keypair, &intent);

        let impostor = Keypair::new().pubkey();
        let result = SignatureVerifier.verify(&impostor, &proof, &intent);
        assert!(matches!(result, Err(IdentityError::SignerMismatch { .. })));
    }

    #[test]
    fn test_intent_kinds_have_distinct_digests() {
        let pool = Pubkey::new_unique();
        let other = Pubkey::new_unique();
        let init = Intent::Initialize {
            pool,
            mint: other,
            vault: other,
        };
        let withdraw = Intent::Withdraw {
            pool,
            staker: StakerId::new(),
            destination: other,
        };
        assert_ne!(init.message(), withdraw.message());
    }
}
