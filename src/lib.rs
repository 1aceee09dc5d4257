//! Stakepool - Pooled Deposit Vault
//!
//! Custodial staking pools: each pool holds one token type in a single vault
//! controlled by an authority derived from the pool's address. Depositors
//! receive shares priced against the vault's live balance and redeem them for
//! a pro-rata slice of whatever the vault holds at withdrawal time.
//!
//! ## Components
//!
//! 1. **Pool Registry** - Pool aggregates, per-pool locking, deposit and withdraw
//! 2. **Staker Ledger** - Active positions indexed by id and by owner
//! 3. **Transfer Boundary** - Token movement behind a trait, with an in-memory ledger
//! 4. **Identity** - Signed intents proving who is calling
//! 5. **Vault Authority** - Program-derived address that alone may debit a vault

pub mod authority;
pub mod common;
pub mod identity;
pub mod ledger;
pub mod registry;
pub mod transfer;
pub mod types;

// Re-exports: registry
pub use registry::{payout_for_shares, shares_for_deposit, PoolRegistry};

// Re-exports: authority and identity
pub use authority::{VaultAuthority, VAULT_AUTHORITY_SEED};
pub use identity::{IdentityError, IdentityVerifier, Intent, OwnerProof, SignatureVerifier};

// Re-exports: transfer boundary
pub use transfer::{
    MemoryTokenLedger, TokenAccount, TransferAuthorization, TransferError, TransferRequest,
    TransferResult, TransferService,
};

// Re-exports: ledger and records
pub use ledger::{LedgerTotals, StakerLedger};
pub use types::{Pool, PoolSnapshot, StakerDetail, StakerId, TransferReceipt, WithdrawReceipt};

// Re-exports: common
pub use common::{
    init_from_config, init_logging, ConfigError, Constraint, LogLevel, StakingConfig,
    StakingError,
};
