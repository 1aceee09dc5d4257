//! Operation Receipts

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::types::staker::StakerId;

/// Proof that the transfer boundary moved funds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Unique receipt ID
    pub id: String,
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
    pub timestamp: u64,
}

/// Result of a successful withdrawal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawReceipt {
    pub staker_id: StakerId,
    pub owner: Pubkey,
    /// Principal originally deposited
    pub principal: u64,
    pub shares_burned: u64,
    /// Amount paid out of the vault
    pub payout: u64,
    pub transfer: TransferReceipt,
}

impl WithdrawReceipt {
    /// Payout minus principal; negative if the vault lost value
    pub fn gain(&self) -> i128 {
        self.payout as i128 - self.principal as i128
    }
}
