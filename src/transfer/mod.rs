//! Transfer Boundary Module
//!
//! This module contains:
//! - The `TransferService` trait the pool registry moves funds through
//! - An in-memory token ledger implementing it

pub mod memory;
pub mod traits;

// Re-exports for convenience
pub use memory::{MemoryTokenLedger, TokenAccount};
pub use traits::{
    TransferAuthorization, TransferError, TransferRequest, TransferResult, TransferService,
};

#[cfg(test)]
pub use traits::MockTransferService;
