//! Pool Registry Module
//!
//! This module contains:
//! - `PoolRegistry`, which owns every pool and runs initialize, deposit and withdraw
//! - Share issuance and redemption math

pub mod math;
pub mod service;

pub use math::{payout_for_shares, shares_for_deposit, Counters};
pub use service::PoolRegistry;
