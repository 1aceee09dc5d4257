//! Transfer Service Interface
//!
//! Boundary to the token-transfer primitive that debits and credits custody
//! accounts. The pool registry never touches balances directly.

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::authority::VaultAuthority;
use crate::types::TransferReceipt;

/// Transfer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds { available: u64, requested: u64 },

    #[error("account not found: {0}")]
    AccountNotFound(Pubkey),

    #[error("account already exists: {0}")]
    AccountExists(Pubkey),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("mint mismatch: {from} holds {from_mint}, {to} holds {to_mint}")]
    MintMismatch {
        from: Pubkey,
        to: Pubkey,
        from_mint: Pubkey,
        to_mint: Pubkey,
    },

    #[error("invalid transfer: {0}")]
    InvalidTransfer(String),

    #[error("balance overflow on {0}")]
    Overflow(Pubkey),
}

/// Result type for transfer operations
pub type TransferResult<T> = Result<T, TransferError>;

/// How a debit from `from` is authorized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferAuthorization {
    /// The account owner, already verified by the caller of the service
    Owner(Pubkey),
    /// The derived vault authority, recomputed for this transfer
    Derived(VaultAuthority),
}

impl TransferAuthorization {
    /// Identity this authorization speaks for
    pub fn identity(&self) -> Pubkey {
        match self {
            TransferAuthorization::Owner(owner) => *owner,
            TransferAuthorization::Derived(authority) => authority.address,
        }
    }
}

/// A requested movement of funds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
    pub authorization: TransferAuthorization,
}

/// Token transfer boundary
///
/// Implementations:
/// - `MemoryTokenLedger` - In-memory custody accounts for tests and simulation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransferService: Send + Sync {
    /// Current balance of a custody account
    async fn balance_of(&self, account: &Pubkey) -> TransferResult<u64>;

    /// Identity controlling a custody account
    async fn owner_of(&self, account: &Pubkey) -> TransferResult<Pubkey>;

    /// Token type held by a custody account
    async fn mint_of(&self, account: &Pubkey) -> TransferResult<Pubkey>;

    /// Move funds; either the whole amount moves or nothing does
    async fn transfer(&self, request: TransferRequest) -> TransferResult<TransferReceipt>;
}
