//! In-Memory Token Ledger
//!
//! Custody accounts kept in process memory. Used by tests and simulations;
//! data is lost when the process exits.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use solana_sdk::pubkey::Pubkey;

use super::traits::{
    TransferAuthorization, TransferError, TransferRequest, TransferResult, TransferService,
};
use crate::types::pool::now_secs;
use crate::types::TransferReceipt;

/// A custody account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAccount {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
}

/// In-memory token ledger
///
/// Thread-safe; every transfer applies under a single write lock.
#[derive(Clone)]
pub struct MemoryTokenLedger {
    accounts: Arc<RwLock<HashMap<Pubkey, TokenAccount>>>,
    /// Namespace derived authorities are checked against
    program_id: Pubkey,
}

impl MemoryTokenLedger {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            program_id,
        }
    }

    /// Open a custody account at a fresh address
    pub async fn create_account(&self, mint: Pubkey, owner: Pubkey) -> Pubkey {
        let address = Pubkey::new_unique();
        self.accounts.write().await.insert(
            address,
            TokenAccount {
                mint,
                owner,
                amount: 0,
            },
        );
        address
    }

    /// Open a custody account at a caller-chosen address
    pub async fn create_account_at(
        &self,
        address: Pubkey,
        mint: Pubkey,
        owner: Pubkey,
    ) -> TransferResult<()> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&address) {
            return Err(TransferError::AccountExists(address));
        }

        accounts.insert(
            address,
            TokenAccount {
                mint,
                owner,
                amount: 0,
            },
        );
        Ok(())
    }

    /// Credit new tokens to an account (issuance or an external top-up)
    pub async fn mint_to(&self, account: &Pubkey, amount: u64) -> TransferResult<u64> {
        let mut accounts = self.accounts.write().await;
        let entry = accounts
            .get_mut(account)
            .ok_or(TransferError::AccountNotFound(*account))?;

        entry.amount = entry
            .amount
            .checked_add(amount)
            .ok_or(TransferError::Overflow(*account))?;
        Ok(entry.amount)
    }

    /// Hand control of an account to a new owner; only the current owner may
    pub async fn set_owner(
        &self,
        account: &Pubkey,
        current_owner: &Pubkey,
        new_owner: Pubkey,
    ) -> TransferResult<()> {
        let mut accounts = self.accounts.write().await;
        let entry = accounts
            .get_mut(account)
            .ok_or(TransferError::AccountNotFound(*account))?;

        if entry.owner != *current_owner {
            return Err(TransferError::Unauthorized(format!(
                "{} does not own {}",
                current_owner, account
            )));
        }

        entry.owner = new_owner;
        Ok(())
    }

    pub async fn account(&self, account: &Pubkey) -> Option<TokenAccount> {
        self.accounts.read().await.get(account).cloned()
    }

    /// Total supply of `mint` across all accounts
    pub async fn supply(&self, mint: &Pubkey) -> u128 {
        self.accounts
            .read()
            .await
            .values()
            .filter(|a| a.mint == *mint)
            .map(|a| a.amount as u128)
            .sum()
    }

    fn check_authorization(
        &self,
        account: &Pubkey,
        owner: &Pubkey,
        authorization: &TransferAuthorization,
    ) -> TransferResult<()> {
        if let TransferAuthorization::Derived(authority) = authorization {
            if !authority.verify(&self.program_id) {
                return Err(TransferError::Unauthorized(format!(
                    "{} is not a derived vault authority",
                    authority.address
                )));
            }
        }

        if authorization.identity() != *owner {
            return Err(TransferError::Unauthorized(format!(
                "{} cannot debit {} owned by {}",
                authorization.identity(),
                account,
                owner
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl TransferService for MemoryTokenLedger {
    async fn balance_of(&self, account: &Pubkey) -> TransferResult<u64> {
        self.accounts
            .read()
            .await
            .get(account)
            .map(|a| a.amount)
            .ok_or(TransferError::AccountNotFound(*account))
    }

    async fn owner_of(&self, account: &Pubkey) -> TransferResult<Pubkey> {
        self.accounts
            .read()
            .await
            .get(account)
            .map(|a| a.owner)
            .ok_or(TransferError::AccountNotFound(*account))
    }

    async fn mint_of(&self, account: &Pubkey) -> TransferResult<Pubkey> {
        self.accounts
            .read()
            .await
            .get(account)
            .map(|a| a.mint)
            .ok_or(TransferError::AccountNotFound(*account))
    }

    async fn transfer(&self, request: TransferRequest) -> TransferResult<TransferReceipt> {
        if request.from == request.to {
            return Err(TransferError::InvalidTransfer(format!(
                "source and destination are both {}",
                request.from
            )));
        }

        let mut accounts = self.accounts.write().await;

        let source = accounts
            .get(&request.from)
            .cloned()
            .ok_or(TransferError::AccountNotFound(request.from))?;
        let destination = accounts
            .get(&request.to)
            .cloned()
            .ok_or(TransferError::AccountNotFound(request.to))?;

        if source.mint != destination.mint {
            return Err(TransferError::MintMismatch {
                from: request.from,
                to: request.to,
                from_mint: source.mint,
                to_mint: destination.mint,
            });
        }

        self.check_authorization(&request.from, &source.owner, &request.authorization)?;

        let debited = source
            .amount
            .checked_sub(request.amount)
            .ok_or(TransferError::InsufficientFunds {
                available: source.amount,
                requested: request.amount,
            })?;
        let credited = destination
            .amount
            .checked_add(request.amount)
            .ok_or(TransferError::Overflow(request.to))?;

        // Both sides validated; apply together.
        if let Some(entry) = accounts.get_mut(&request.from) {
            entry.amount = debited;
        }
        if let Some(entry) = accounts.get_mut(&request.to) {
            entry.amount = credited;
        }

        Ok(TransferReceipt {
            id: format!("tx_{}", uuid::Uuid::new_v4().simple()),
            from: request.from,
            to: request.to,
            amount: request.amount,
            timestamp: now_secs(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::VaultAuthority;

    async fn funded_pair(ledger: &MemoryTokenLedger, amount: u64) -> (Pubkey, Pubkey, Pubkey) {
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let from = ledger.create_account(mint, owner).await;
        let to = ledger.create_account(mint, Pubkey::new_unique()).await;
        ledger.mint_to(&from, amount).await.unwrap();
        (owner, from, to)
    }

    #[tokio::test]
    async fn test_owner_transfer() {
        let ledger = MemoryTokenLedger::new(Pubkey::new_unique());
        let (owner, from, to) = funded_pair(&ledger, 100).await;

        let receipt = ledger
            .transfer(TransferRequest {
                from,
                to,
                amount: 40,
                authorization: TransferAuthorization::Owner(owner),
            })
            .await
            .unwrap();

        assert_eq!(receipt.amount, 40);
        assert_eq!(ledger.balance_of(&from).await.unwrap(), 60);
        assert_eq!(ledger.balance_of(&to).await.unwrap(), 40);
    }

    #[tokio::test]
    async fn test_insufficient_funds_leaves_balances() {
        let ledger = MemoryTokenLedger::new(Pubkey::new_unique());
        let (owner, from, to) = funded_pair(&ledger, 10).await;

        let result = ledger
            .transfer(TransferRequest {
                from,
                to,
                amount: 11,
                authorization: TransferAuthorization::Owner(owner),
            })
            .await;

        assert_eq!(
            result,
            Err(TransferError::InsufficientFunds {
                available: 10,
                requested: 11
            })
        );
        assert_eq!(ledger.balance_of(&from).await.unwrap(), 10);
        assert_eq!(ledger.balance_of(&to).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_non_owner_cannot_debit() {
        let ledger = MemoryTokenLedger::new(Pubkey::new_unique());
        let (_owner, from, to) = funded_pair(&ledger, 10).await;

        let result = ledger
            .transfer(TransferRequest {
                from,
                to,
                amount: 1,
                authorization: TransferAuthorization::Owner(Pubkey::new_unique()),
            })
            .await;

        assert!(matches!(result, Err(TransferError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_derived_authority_debits_vault() {
        let program_id = Pubkey::new_unique();
        let ledger = MemoryTokenLedger::new(program_id);
        let mint = Pubkey::new_unique();
        let authority = VaultAuthority::derive(&Pubkey::new_unique(), &program_id);

        let vault = ledger.create_account(mint, authority.address).await;
        let user = ledger.create_account(mint, Pubkey::new_unique()).await;
        ledger.mint_to(&vault, 50).await.unwrap();

        ledger
            .transfer(TransferRequest {
                from: vault,
                to: user,
                amount: 50,
                authorization: TransferAuthorization::Derived(authority),
            })
            .await
            .unwrap();

        assert_eq!(ledger.balance_of(&vault).await.unwrap(), 0);
        assert_eq!(ledger.balance_of(&user).await.unwrap(), 50);
    }

    #[tokio::test]
    async fn test_derived_authority_from_other_namespace_rejected() {
        let ledger = MemoryTokenLedger::new(Pubkey::new_unique());
        let mint = Pubkey::new_unique();
        let foreign = VaultAuthority::derive(&Pubkey::new_unique(), &Pubkey::new_unique());

        let vault = ledger.create_account(mint, foreign.address).await;
        let user = ledger.create_account(mint, Pubkey::new_unique()).await;
        ledger.mint_to(&vault, 5).await.unwrap();

        let result = ledger
            .transfer(TransferRequest {
                from: vault,
                to: user,
                amount: 5,
                authorization: TransferAuthorization::Derived(foreign),
            })
            .await;

        assert!(matches!(result, Err(TransferError::Unauthorized(_))));
        assert_eq!(ledger.balance_of(&vault).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_mint_mismatch() {
        let ledger = MemoryTokenLedger::new(Pubkey::new_unique());
        let owner = Pubkey::new_unique();
        let from = ledger.create_account(Pubkey::new_unique(), owner).await;
        let to = ledger
            .create_account(Pubkey::new_unique(), Pubkey::new_unique())
            .await;
        ledger.mint_to(&from, 5).await.unwrap();

        let result = ledger
            .transfer(TransferRequest {
                from,
                to,
                amount: 5,
                authorization: TransferAuthorization::Owner(owner),
            })
            .await;

        assert!(matches!(result, Err(TransferError::MintMismatch { .. })));
    }

    #[tokio::test]
    async fn test_set_owner_requires_current_owner() {
        let ledger = MemoryTokenLedger::new(Pubkey::new_unique());
        let owner = Pubkey::new_unique();
        let account = ledger.create_account(Pubkey::new_unique(), owner).await;
        let new_owner = Pubkey::new_unique();

        assert!(ledger
            .set_owner(&account, &Pubkey::new_unique(), new_owner)
            .await
            .is_err());
        ledger.set_owner(&account, &owner, new_owner).await.unwrap();
        assert_eq!(ledger.owner_of(&account).await.unwrap(), new_owner);
    }

    #[tokio::test]
    async fn test_create_account_at_rejects_duplicates() {
        let ledger = MemoryTokenLedger::new(Pubkey::new_unique());
        let address = Pubkey::new_unique();
        let mint = Pubkey::new_unique();

        ledger
            .create_account_at(address, mint, Pubkey::new_unique())
            .await
            .unwrap();
        let result = ledger
            .create_account_at(address, mint, Pubkey::new_unique())
            .await;
        assert_eq!(result, Err(TransferError::AccountExists(address)));
    }
}
