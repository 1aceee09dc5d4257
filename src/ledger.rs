//! Staker Ledger
//!
//! Active positions of one pool, stored as records indexed by staker id with a
//! secondary index from owner to staker id. Records are inserted on deposit and
//! removed on withdraw. The ledger is owned by the pool entry and only touched
//! while that pool's lock is held.

use std::collections::HashMap;

use solana_sdk::pubkey::Pubkey;

use crate::common::{Constraint, Result, StakingError};
use crate::types::{StakerDetail, StakerId};

#[derive(Debug, Default)]
pub struct StakerLedger {
    /// Records indexed by staker ID
    records: HashMap<StakerId, StakerDetail>,
    /// Index: owner -> staker ID
    by_owner: HashMap<Pubkey, StakerId>,
    /// Insertion sequence per record
    opened: HashMap<StakerId, u64>,
    next_seq: u64,
}

/// Sums over all active records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerTotals {
    pub count: usize,
    pub deposited: u128,
    pub shares: u128,
}

impl StakerLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail if `owner` already holds an open position
    pub fn ensure_no_position(&self, owner: &Pubkey) -> Result<()> {
        if self.by_owner.contains_key(owner) {
            return Err(Constraint::PositionAlreadyOpen(*owner).into());
        }
        Ok(())
    }

    pub fn insert(&mut self, record: StakerDetail) -> Result<StakerId> {
        self.ensure_no_position(&record.owner)?;

        let id = record.id;
        self.by_owner.insert(record.owner, id);
        self.opened.insert(id, self.next_seq);
        self.next_seq += 1;
        self.records.insert(id, record);
        Ok(id)
    }

    pub fn get(&self, id: &StakerId) -> Option<&StakerDetail> {
        self.records.get(id)
    }

    /// Look up a record, failing with `StakerNotFound`
    pub fn require(&self, id: &StakerId) -> Result<&StakerDetail> {
        self.records
            .get(id)
            .ok_or_else(|| StakingError::StakerNotFound(id.to_string()))
    }

    pub fn get_by_owner(&self, owner: &Pubkey) -> Option<&StakerDetail> {
        self.by_owner
            .get(owner)
            .and_then(|id| self.records.get(id))
    }

    pub fn remove(&mut self, id: &StakerId) -> Option<StakerDetail> {
        let record = self.records.remove(id)?;
        self.by_owner.remove(&record.owner);
        self.opened.remove(id);
        Some(record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in the order they were opened
    pub fn records(&self) -> Vec<StakerDetail> {
        let mut records: Vec<(u64, StakerDetail)> = self
            .records
            .values()
            .map(|r| (self.opened.get(&r.id).copied().unwrap_or(u64::MAX), r.clone()))
            .collect();
        records.sort_by_key(|(seq, _)| *seq);
        records.into_iter().map(|(_, r)| r).collect()
    }

    pub fn totals(&self) -> LedgerTotals {
        self.records
            .values()
            .fold(LedgerTotals::default(), |acc, r| LedgerTotals {
                count: acc.count + 1,
                deposited: acc.deposited + r.deposited as u128,
                shares: acc.shares + r.shares as u128,
            })
    }
}
