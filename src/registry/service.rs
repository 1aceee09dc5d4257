//! Pool Registry
//!
//! Owns every pool aggregate together with its staker ledger and runs the
//! three mutating operations against them.
//!
//! Each pool sits behind its own mutex. The lock is held for the whole of
//! one operation: admission check, vault balance read, share math, the
//! external transfer and the counter commit. Operations on different pools
//! never contend. Counter updates are computed with checked arithmetic before
//! the transfer is issued and committed only after it succeeds, so a failure
//! at any step leaves the pool exactly as it was.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};

use crate::authority::VaultAuthority;
use crate::common::{
    generate_correlation_id, log_deposit_event, log_pool_event, log_security_event,
    log_withdrawal_event, Constraint, Result, StakingConfig, StakingError,
};
use crate::identity::{IdentityVerifier, Intent, OwnerProof, SignatureVerifier};
use crate::ledger::StakerLedger;
use crate::registry::math::{self, Counters};
use crate::transfer::{TransferAuthorization, TransferRequest, TransferService};
use crate::types::{Pool, PoolSnapshot, StakerDetail, StakerId, WithdrawReceipt};

/// A pool and its positions, guarded together
#[derive(Debug)]
struct PoolEntry {
    pool: Pool,
    ledger: StakerLedger,
}

impl PoolEntry {
    fn counters(&self) -> Counters {
        Counters {
            stakers_count: self.pool.stakers_count,
            total_staked: self.pool.total_staked,
            total_shares: self.pool.total_shares,
        }
    }

    fn commit(&mut self, counters: Counters) {
        self.pool.stakers_count = counters.stakers_count;
        self.pool.total_staked = counters.total_staked;
        self.pool.total_shares = counters.total_shares;
        self.pool.touch();
    }
}

/// Pool registry service
pub struct PoolRegistry {
    config: StakingConfig,

    /// Pools by id, each behind its own lock
    pools: RwLock<HashMap<Pubkey, Arc<Mutex<PoolEntry>>>>,

    /// Token transfer boundary
    transfers: Arc<dyn TransferService>,

    /// Caller identity check
    verifier: Arc<dyn IdentityVerifier>,
}

impl PoolRegistry {
    /// Create a registry verifying callers by ed25519 signature
    pub fn new(config: StakingConfig, transfers: Arc<dyn TransferService>) -> Self {
        Self::with_verifier(config, transfers, Arc::new(SignatureVerifier))
    }

    pub fn with_verifier(
        config: StakingConfig,
        transfers: Arc<dyn TransferService>,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Self {
        Self {
            config,
            pools: RwLock::new(HashMap::new()),
            transfers,
            verifier,
        }
    }

    /// Create a registry from environment configuration
    pub fn from_env(transfers: Arc<dyn TransferService>) -> Result<Self> {
        Ok(Self::new(StakingConfig::from_env()?, transfers))
    }

    pub fn config(&self) -> &StakingConfig {
        &self.config
    }

    /// Fresh address for a new pool to occupy
    ///
    /// Provision the vault owned by `vault_authority_for(id)` first, then
    /// call `initialize` with the same id.
    pub fn reserve_pool_id(&self) -> Pubkey {
        Keypair::new().pubkey()
    }

    /// The authority that must control the vault of `pool_id`
    pub fn vault_authority_for(&self, pool_id: &Pubkey) -> VaultAuthority {
        VaultAuthority::derive(pool_id, &self.config.program_id)
    }

    // ========================================================================
    // Initialize
    // ========================================================================

    /// Register a pool over an already provisioned vault
    pub async fn initialize(
        &self,
        pool_id: Pubkey,
        mint: Pubkey,
        vault: Pubkey,
        authority: Pubkey,
        proof: &OwnerProof,
    ) -> Result<Pubkey> {
        let correlation_id = generate_correlation_id();
        self.authenticate(
            &authority,
            proof,
            &Intent::Initialize {
                pool: pool_id,
                mint,
                vault,
            },
            &correlation_id,
        )?;

        if self.pools.read().await.contains_key(&pool_id) {
            return Err(StakingError::PoolAlreadyExists(pool_id));
        }

        // Vault reads go to the transfer boundary; the registry map stays unlocked
        let derived = self.vault_authority_for(&pool_id);
        let vault_owner = self.transfers.owner_of(&vault).await?;
        if vault_owner != derived.address {
            log_security_event(
                "vault_owner_mismatch",
                serde_json::json!({
                    "pool_id": pool_id.to_string(),
                    "vault": vault.to_string(),
                    "expected": derived.address.to_string(),
                    "found": vault_owner.to_string()
                }),
                &correlation_id,
            );
            return Err(Constraint::VaultOwnerMismatch {
                expected: derived.address,
                found: vault_owner,
            }
            .into());
        }

        let vault_mint = self.transfers.mint_of(&vault).await?;
        if vault_mint != mint {
            return Err(Constraint::VaultMintMismatch {
                expected: mint,
                found: vault_mint,
            }
            .into());
        }

        let mut pools = self.pools.write().await;
        if pools.contains_key(&pool_id) {
            return Err(StakingError::PoolAlreadyExists(pool_id));
        }

        let pool = Pool::new(pool_id, mint, vault, authority, derived.bump);
        pools.insert(
            pool_id,
            Arc::new(Mutex::new(PoolEntry {
                pool,
                ledger: StakerLedger::new(),
            })),
        );
        drop(pools);

        log_pool_event(
            "pool_initialized",
            &correlation_id,
            &pool_id.to_string(),
            &mint.to_string(),
            &vault.to_string(),
        );
        Ok(pool_id)
    }

    // ========================================================================
    // Deposit
    // ========================================================================

    /// Move `amount` from `funding` into the vault and open a position for `owner`
    pub async fn deposit(
        &self,
        pool_id: Pubkey,
        amount: u64,
        owner: Pubkey,
        funding: Pubkey,
        proof: &OwnerProof,
    ) -> Result<StakerId> {
        let correlation_id = generate_correlation_id();
        let result = self
            .deposit_inner(pool_id, amount, owner, funding, proof, &correlation_id)
            .await;

        match &result {
            Ok((_, shares)) => log_deposit_event(
                &correlation_id,
                &pool_id.to_string(),
                &owner.to_string(),
                amount,
                *shares,
                None,
            ),
            Err(e) => log_deposit_event(
                &correlation_id,
                &pool_id.to_string(),
                &owner.to_string(),
                amount,
                0,
                Some((e.error_code(), &e.to_string())),
            ),
        }

        result.map(|(id, _)| id)
    }

    async fn deposit_inner(
        &self,
        pool_id: Pubkey,
        amount: u64,
        owner: Pubkey,
        funding: Pubkey,
        proof: &OwnerProof,
        correlation_id: &str,
    ) -> Result<(StakerId, u64)> {
        self.authenticate(
            &owner,
            proof,
            &Intent::Deposit {
                pool: pool_id,
                amount,
                funding,
            },
            correlation_id,
        )?;

        if amount < self.config.min_deposit {
            return Err(StakingError::InvalidAmount(format!(
                "deposit {} below minimum {}",
                amount, self.config.min_deposit
            )));
        }

        let entry = self.entry(&pool_id).await?;
        let mut entry = entry.lock().await;

        if entry.pool.stakers_count >= self.config.max_stakers {
            return Err(StakingError::CapacityExceeded {
                max: self.config.max_stakers,
            });
        }
        entry.ledger.ensure_no_position(&owner)?;

        let vault_balance = self.transfers.balance_of(&entry.pool.vault).await?;
        let shares = math::shares_for_deposit(amount, entry.pool.total_shares, vault_balance)?;
        if shares == 0 {
            return Err(StakingError::InvalidAmount(format!(
                "deposit {} too small to issue a share at vault balance {}",
                amount, vault_balance
            )));
        }
        let counters = entry.counters().after_deposit(amount, shares)?;

        self.transfers
            .transfer(TransferRequest {
                from: funding,
                to: entry.pool.vault,
                amount,
                authorization: TransferAuthorization::Owner(owner),
            })
            .await?;

        let id = entry
            .ledger
            .insert(StakerDetail::new(pool_id, owner, amount, shares))?;
        entry.commit(counters);

        tracing::debug!(
            target: "stakepool::deposit",
            pool_id = %pool_id,
            staker_id = %id,
            vault_balance,
            shares,
            "position opened"
        );

        Ok((id, shares))
    }

    // ========================================================================
    // Withdraw
    // ========================================================================

    /// Close a position, paying its pro-rata share of the vault to `destination`
    pub async fn withdraw(
        &self,
        pool_id: Pubkey,
        staker_id: StakerId,
        owner: Pubkey,
        destination: Pubkey,
        proof: &OwnerProof,
    ) -> Result<WithdrawReceipt> {
        let correlation_id = generate_correlation_id();
        let result = self
            .withdraw_inner(pool_id, staker_id, owner, destination, proof, &correlation_id)
            .await;

        match &result {
            Ok(receipt) => log_withdrawal_event(
                &correlation_id,
                &pool_id.to_string(),
                &staker_id.to_string(),
                receipt.payout,
                receipt.shares_burned,
                None,
            ),
            Err(e) => log_withdrawal_event(
                &correlation_id,
                &pool_id.to_string(),
                &staker_id.to_string(),
                0,
                0,
                Some((e.error_code(), &e.to_string())),
            ),
        }

        result
    }

    async fn withdraw_inner(
        &self,
        pool_id: Pubkey,
        staker_id: StakerId,
        owner: Pubkey,
        destination: Pubkey,
        proof: &OwnerProof,
        correlation_id: &str,
    ) -> Result<WithdrawReceipt> {
        self.authenticate(
            &owner,
            proof,
            &Intent::Withdraw {
                pool: pool_id,
                staker: staker_id,
                destination,
            },
            correlation_id,
        )?;

        let entry = self.entry(&pool_id).await?;
        let mut entry = entry.lock().await;

        let record = entry.ledger.require(&staker_id)?.clone();
        if !record.is_owned_by(&owner) {
            log_security_event(
                "owner_mismatch",
                serde_json::json!({
                    "pool_id": pool_id.to_string(),
                    "staker_id": staker_id.to_string(),
                    "recorded": record.owner.to_string(),
                    "caller": owner.to_string()
                }),
                correlation_id,
            );
            return Err(StakingError::owner_mismatch(record.owner, owner));
        }

        let vault_balance = self.transfers.balance_of(&entry.pool.vault).await?;
        let payout = math::payout_for_shares(record.shares, entry.pool.total_shares, vault_balance)?;
        let counters = entry
            .counters()
            .after_withdraw(record.deposited, record.shares)?;

        let authority = VaultAuthority::from_bump(
            &pool_id,
            entry.pool.authority_bump,
            &self.config.program_id,
        )
        .ok_or_else(|| {
            StakingError::InvariantViolated(format!(
                "stored bump {} does not derive a vault authority",
                entry.pool.authority_bump
            ))
        })?;

        let transfer = self
            .transfers
            .transfer(TransferRequest {
                from: entry.pool.vault,
                to: destination,
                amount: payout,
                authorization: TransferAuthorization::Derived(authority),
            })
            .await?;

        entry.ledger.remove(&staker_id);
        entry.commit(counters);

        Ok(WithdrawReceipt {
            staker_id,
            owner,
            principal: record.deposited,
            shares_burned: record.shares,
            payout,
            transfer,
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn pool(&self, pool_id: &Pubkey) -> Option<Pool> {
        let entry = self.entry(pool_id).await.ok()?;
        let entry = entry.lock().await;
        Some(entry.pool.clone())
    }

    pub async fn pool_ids(&self) -> Vec<Pubkey> {
        self.pools.read().await.keys().copied().collect()
    }

    pub async fn staker(&self, pool_id: &Pubkey, staker_id: &StakerId) -> Option<StakerDetail> {
        let entry = self.entry(pool_id).await.ok()?;
        let entry = entry.lock().await;
        entry.ledger.get(staker_id).cloned()
    }

    pub async fn staker_by_owner(&self, pool_id: &Pubkey, owner: &Pubkey) -> Option<StakerDetail> {
        let entry = self.entry(pool_id).await.ok()?;
        let entry = entry.lock().await;
        entry.ledger.get_by_owner(owner).cloned()
    }

    pub async fn stakers(&self, pool_id: &Pubkey) -> Result<Vec<StakerDetail>> {
        let entry = self.entry(pool_id).await?;
        let entry = entry.lock().await;
        Ok(entry.ledger.records())
    }

    /// Shares a deposit of `amount` would receive right now
    pub async fn preview_deposit(&self, pool_id: &Pubkey, amount: u64) -> Result<u64> {
        let entry = self.entry(pool_id).await?;
        let entry = entry.lock().await;
        let vault_balance = self.transfers.balance_of(&entry.pool.vault).await?;
        math::shares_for_deposit(amount, entry.pool.total_shares, vault_balance)
    }

    /// Payout a withdrawal of `staker_id` would receive right now
    pub async fn preview_withdraw(&self, pool_id: &Pubkey, staker_id: &StakerId) -> Result<u64> {
        let entry = self.entry(pool_id).await?;
        let entry = entry.lock().await;
        let record = entry.ledger.require(staker_id)?;
        let vault_balance = self.transfers.balance_of(&entry.pool.vault).await?;
        math::payout_for_shares(record.shares, entry.pool.total_shares, vault_balance)
    }

    /// Pool, vault balance and positions read under one lock
    pub async fn snapshot(&self, pool_id: &Pubkey) -> Result<PoolSnapshot> {
        let entry = self.entry(pool_id).await?;
        let entry = entry.lock().await;
        let vault_balance = self.transfers.balance_of(&entry.pool.vault).await?;
        Ok(PoolSnapshot {
            pool: entry.pool.clone(),
            vault_balance,
            stakers: entry.ledger.records(),
        })
    }

    /// Check the pool counters against its ledger
    pub async fn check_invariants(&self, pool_id: &Pubkey) -> Result<()> {
        let entry = self.entry(pool_id).await?;
        let entry = entry.lock().await;
        let pool = &entry.pool;
        let totals = entry.ledger.totals();

        if totals.deposited != pool.total_staked as u128 {
            return Err(StakingError::InvariantViolated(format!(
                "total_staked {} != sum of deposits {}",
                pool.total_staked, totals.deposited
            )));
        }
        if totals.shares != pool.total_shares as u128 {
            return Err(StakingError::InvariantViolated(format!(
                "total_shares {} != sum of shares {}",
                pool.total_shares, totals.shares
            )));
        }
        if totals.count != pool.stakers_count as usize {
            return Err(StakingError::InvariantViolated(format!(
                "stakers_count {} != active records {}",
                pool.stakers_count, totals.count
            )));
        }
        if pool.stakers_count > self.config.max_stakers {
            return Err(StakingError::InvariantViolated(format!(
                "stakers_count {} above cap {}",
                pool.stakers_count, self.config.max_stakers
            )));
        }
        if (pool.total_shares == 0) != (pool.total_staked == 0) {
            return Err(StakingError::InvariantViolated(format!(
                "total_shares {} and total_staked {} disagree on emptiness",
                pool.total_shares, pool.total_staked
            )));
        }

        Ok(())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn entry(&self, pool_id: &Pubkey) -> Result<Arc<Mutex<PoolEntry>>> {
        self.pools
            .read()
            .await
            .get(pool_id)
            .cloned()
            .ok_or(StakingError::PoolNotFound(*pool_id))
    }

    fn authenticate(
        &self,
        claimed: &Pubkey,
        proof: &OwnerProof,
        intent: &Intent,
        correlation_id: &str,
    ) -> Result<()> {
        self.verifier.verify(claimed, proof, intent).map_err(|e| {
            log_security_event(
                "identity_rejected",
                serde_json::json!({
                    "claimed": claimed.to_string(),
                    "reason": e.to_string()
                }),
                correlation_id,
            );
            StakingError::Unauthorized(e.to_string())
        })
    }
}
