//! Shared Types Module
//!
//! Records held by the pool registry and returned to callers.

pub mod pool;
pub mod receipt;
pub mod staker;

// Re-exports for convenience
pub use pool::{Pool, PoolSnapshot};
pub use receipt::{TransferReceipt, WithdrawReceipt};
pub use staker::{StakerDetail, StakerId};
