//! Bank accounts and the bank ledger
//!
//! Bank accounts optionally link to a GL account; transactions on linked
//! accounts are shadowed into the journal by the bank posting engine.
//! Accounts without a link still keep a correct bank ledger - only the
//! journal shadow is skipped.

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::posting::{
    BankPostingEngine, BankTransactionKind, BankTransactionPosting, BankTransferPosting,
    PostingEvent,
};
use crate::traits::{ChartStore, FinanceStore, RegistryStore};
use crate::types::*;
use crate::utils::references;
use crate::utils::validation::validate_positive_amount;

/// A bank account held by the school
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankAccount {
    pub id: String,
    pub name: String,
    pub account_number: String,
    /// GL account this bank account settles into, if linked
    pub gl_code: Option<String>,
    pub balance: BigDecimal,
    pub opened_on: NaiveDate,
    pub recorded_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    /// Optimistic-concurrency token
    pub version: u64,
}

/// One movement on a bank account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTransaction {
    pub id: String,
    pub bank_account_id: String,
    pub kind: BankTransactionKind,
    pub amount: BigDecimal,
    pub description: String,
    pub reference: String,
    pub transaction_date: NaiveDate,
    pub recorded_at: NaiveDateTime,
}

/// Service owning bank accounts and their ledgers
pub struct BankingService<S: FinanceStore + Clone> {
    storage: S,
    engine: BankPostingEngine<S>,
}

impl<S: FinanceStore + Clone> BankingService<S> {
    pub fn new(storage: S) -> Self {
        Self {
            engine: BankPostingEngine::new(storage.clone()),
            storage,
        }
    }

    /// Open a bank account. A GL link, when given, must point at an
    /// existing active account.
    pub async fn open_account(
        &mut self,
        name: String,
        account_number: String,
        gl_code: Option<String>,
        opened_on: NaiveDate,
    ) -> FinanceResult<BankAccount> {
        if let Some(ref code) = gl_code {
            match self.storage.get_account(code).await? {
                Some(account) if account.is_active => {}
                _ => {
                    return Err(FinanceError::Validation(format!(
                        "GL link '{}' does not resolve to an active account",
                        code
                    )))
                }
            }
        }

        let now = chrono::Utc::now().naive_utc();
        let account = BankAccount {
            id: Uuid::new_v4().to_string(),
            name,
            account_number,
            gl_code,
            balance: BigDecimal::from(0),
            opened_on,
            recorded_at: now,
            updated_at: now,
            version: 0,
        };
        self.storage.save_bank_account(&account).await?;
        Ok(account)
    }

    async fn apply_transaction(
        &mut self,
        account_id: &str,
        kind: BankTransactionKind,
        amount: BigDecimal,
        description: String,
        transaction_date: NaiveDate,
    ) -> FinanceResult<BankTransaction> {
        validate_positive_amount(&amount)?;
        let mut account = self.get_required_account(account_id).await?;

        if !kind.is_inflow() && account.balance < amount {
            return Err(FinanceError::PolicyViolation(format!(
                "Insufficient funds on '{}': balance {}, requested {}",
                account.name, account.balance, amount
            )));
        }

        if kind.is_inflow() {
            account.balance += &amount;
        } else {
            account.balance -= &amount;
        }
        account.updated_at = chrono::Utc::now().naive_utc();
        let account = self.storage.update_bank_account(&account).await?;

        let txn = BankTransaction {
            id: Uuid::new_v4().to_string(),
            bank_account_id: account.id.clone(),
            kind,
            amount: amount.clone(),
            description: description.clone(),
            reference: references::bank_reference(transaction_date.year()),
            transaction_date,
            recorded_at: chrono::Utc::now().naive_utc(),
        };
        self.storage.save_bank_transaction(&txn).await?;

        let event = PostingEvent::BankTransaction(BankTransactionPosting {
            bank_name: account.name.clone(),
            gl_code: account.gl_code.clone(),
            kind,
            amount,
            description,
            reference: txn.reference.clone(),
            entry_date: transaction_date,
        });
        super::shadow_post_bank(&mut self.storage, &mut self.engine, event).await;

        Ok(txn)
    }

    pub async fn record_deposit(
        &mut self,
        account_id: &str,
        amount: BigDecimal,
        description: String,
        transaction_date: NaiveDate,
    ) -> FinanceResult<BankTransaction> {
        self.apply_transaction(
            account_id,
            BankTransactionKind::Deposit,
            amount,
            description,
            transaction_date,
        )
        .await
    }

    pub async fn record_withdrawal(
        &mut self,
        account_id: &str,
        amount: BigDecimal,
        description: String,
        transaction_date: NaiveDate,
    ) -> FinanceResult<BankTransaction> {
        self.apply_transaction(
            account_id,
            BankTransactionKind::Withdrawal,
            amount,
            description,
            transaction_date,
        )
        .await
    }

    pub async fn record_charge(
        &mut self,
        account_id: &str,
        amount: BigDecimal,
        description: String,
        transaction_date: NaiveDate,
    ) -> FinanceResult<BankTransaction> {
        self.apply_transaction(
            account_id,
            BankTransactionKind::Charge,
            amount,
            description,
            transaction_date,
        )
        .await
    }

    pub async fn record_interest(
        &mut self,
        account_id: &str,
        amount: BigDecimal,
        description: String,
        transaction_date: NaiveDate,
    ) -> FinanceResult<BankTransaction> {
        self.apply_transaction(
            account_id,
            BankTransactionKind::Interest,
            amount,
            description,
            transaction_date,
        )
        .await
    }

    /// Move money between two of the school's bank accounts. The bank
    /// ledger gets a transaction on each side; the journal gets one
    /// two-line entry (or none, when either side lacks a GL link).
    pub async fn transfer(
        &mut self,
        from_id: &str,
        to_id: &str,
        amount: BigDecimal,
        transaction_date: NaiveDate,
    ) -> FinanceResult<(BankTransaction, BankTransaction)> {
        validate_positive_amount(&amount)?;
        if from_id == to_id {
            return Err(FinanceError::Validation(
                "Cannot transfer an account into itself".to_string(),
            ));
        }

        let mut from = self.get_required_account(from_id).await?;
        let mut to = self.get_required_account(to_id).await?;

        if from.balance < amount {
            return Err(FinanceError::PolicyViolation(format!(
                "Insufficient funds on '{}': balance {}, requested {}",
                from.name, from.balance, amount
            )));
        }

        let now = chrono::Utc::now().naive_utc();
        from.balance -= &amount;
        from.updated_at = now;
        let from = self.storage.update_bank_account(&from).await?;
        to.balance += &amount;
        to.updated_at = now;
        let to = self.storage.update_bank_account(&to).await?;

        let reference = references::transfer_reference(transaction_date.year());
        let description = format!("Transfer {} -> {}", from.name, to.name);

        let out_txn = BankTransaction {
            id: Uuid::new_v4().to_string(),
            bank_account_id: from.id.clone(),
            kind: BankTransactionKind::TransferOut,
            amount: amount.clone(),
            description: description.clone(),
            reference: reference.clone(),
            transaction_date,
            recorded_at: now,
        };
        let in_txn = BankTransaction {
            id: Uuid::new_v4().to_string(),
            bank_account_id: to.id.clone(),
            kind: BankTransactionKind::TransferIn,
            amount: amount.clone(),
            description,
            reference: reference.clone(),
            transaction_date,
            recorded_at: now,
        };
        self.storage.save_bank_transaction(&out_txn).await?;
        self.storage.save_bank_transaction(&in_txn).await?;

        let event = PostingEvent::BankTransfer(BankTransferPosting {
            from_name: from.name.clone(),
            from_gl_code: from.gl_code.clone(),
            to_name: to.name.clone(),
            to_gl_code: to.gl_code.clone(),
            amount,
            reference,
            entry_date: transaction_date,
        });
        super::shadow_post_bank(&mut self.storage, &mut self.engine, event).await;

        Ok((out_txn, in_txn))
    }

    pub async fn get_required_account(&self, id: &str) -> FinanceResult<BankAccount> {
        self.storage
            .get_bank_account(id)
            .await?
            .ok_or_else(|| FinanceError::RecordNotFound(format!("bank account {}", id)))
    }

    pub async fn list_accounts(&self) -> FinanceResult<Vec<BankAccount>> {
        self.storage.list_bank_accounts().await
    }

    pub async fn list_transactions(
        &self,
        account_id: Option<&str>,
    ) -> FinanceResult<Vec<BankTransaction>> {
        self.storage.list_bank_transactions(account_id).await
    }
}
