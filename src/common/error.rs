//! Common Error Types for the Staking Pool
//!
//! Every failure is all-or-nothing: when one of these is returned, no counter,
//! ledger record or transfer from the failed operation is visible.

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::transfer::TransferError;

/// Structural preconditions that can fail
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Constraint {
    /// Vault is not controlled by the authority derived from the pool id
    #[error("vault owner mismatch: expected {expected}, found {found}")]
    VaultOwnerMismatch { expected: Pubkey, found: Pubkey },

    /// Vault holds a different token than the pool
    #[error("vault mint mismatch: expected {expected}, found {found}")]
    VaultMintMismatch { expected: Pubkey, found: Pubkey },

    /// Caller is not the recorded owner of the position
    #[error("owner mismatch: position owned by {recorded}, caller {caller}")]
    OwnerMismatch { recorded: Pubkey, caller: Pubkey },

    /// Owner already holds an open position in this pool
    #[error("position already open for {0}")]
    PositionAlreadyOpen(Pubkey),
}

/// Root error type for pool operations
#[derive(Debug, Error)]
pub enum StakingError {
    #[error("constraint violation: {0}")]
    ConstraintViolation(Constraint),

    #[error("Stakers cap reached (max {max})")]
    CapacityExceeded { max: u8 },

    #[error("transfer failed: {0}")]
    Transfer(#[from] TransferError),

    #[error("arithmetic overflow: {0}")]
    ArithmeticOverflow(&'static str),

    #[error("arithmetic underflow: {0}")]
    ArithmeticUnderflow(&'static str),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("pool not found: {0}")]
    PoolNotFound(Pubkey),

    #[error("pool already exists: {0}")]
    PoolAlreadyExists(Pubkey),

    #[error("staker not found: {0}")]
    StakerNotFound(String),

    #[error("invariant violated: {0}")]
    InvariantViolated(String),

    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl StakingError {
    /// Shorthand for the owner equality failure on withdraw
    pub fn owner_mismatch(recorded: Pubkey, caller: Pubkey) -> Self {
        Self::ConstraintViolation(Constraint::OwnerMismatch { recorded, caller })
    }

    pub fn is_owner_mismatch(&self) -> bool {
        matches!(
            self,
            Self::ConstraintViolation(Constraint::OwnerMismatch { .. })
        )
    }

    pub fn is_insufficient_funds(&self) -> bool {
        matches!(self, Self::Transfer(TransferError::InsufficientFunds { .. }))
    }

    /// Pool operations are never retried automatically
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for callers
    pub fn error_code(&self) -> &'static str {
        match self {
            StakingError::ConstraintViolation(Constraint::OwnerMismatch { .. }) => "OWNER_MISMATCH",
            StakingError::ConstraintViolation(_) => "CONSTRAINT_VIOLATION",
            StakingError::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            StakingError::Transfer(TransferError::InsufficientFunds { .. }) => "INSUFFICIENT_FUNDS",
            StakingError::Transfer(_) => "TRANSFER_FAILURE",
            StakingError::ArithmeticOverflow(_) => "ARITHMETIC_OVERFLOW",
            StakingError::ArithmeticUnderflow(_) => "ARITHMETIC_UNDERFLOW",
            StakingError::InvalidAmount(_) => "INVALID_AMOUNT",
            StakingError::Unauthorized(_) => "UNAUTHORIZED",
            StakingError::PoolNotFound(_) => "POOL_NOT_FOUND",
            StakingError::PoolAlreadyExists(_) => "POOL_ALREADY_EXISTS",
            StakingError::StakerNotFound(_) => "STAKER_NOT_FOUND",
            StakingError::InvariantViolated(_) => "INVARIANT_VIOLATED",
            StakingError::Config(_) => "CONFIG_ERROR",
        }
    }
}

impl From<Constraint> for StakingError {
    fn from(constraint: Constraint) -> Self {
        Self::ConstraintViolation(constraint)
    }
}

/// Result type alias using StakingError
pub type Result<T> = std::result::Result<T, StakingError>;
