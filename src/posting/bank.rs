//! Bank-transaction auto-posting
//!
//! Same pattern as the main engine, for the bank ledger: deposits debit
//! the linked GL bank account and credit a contra account inferred from
//! the transaction kind; withdrawals mirror. Transfers between two
//! GL-linked accounts post as one two-line entry. A bank account with no
//! GL link never blocks the bank ledger - its transactions are simply not
//! shadowed into the journal.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::chart::{codes, ChartManager};
use crate::journal::{EntryBuilder, JournalManager};
use crate::mapping::{MappingResolver, MappingType};
use crate::traits::FinanceStore;
use crate::types::*;
use crate::utils::validation::validate_positive_amount;

/// Kinds of bank-ledger transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankTransactionKind {
    Deposit,
    Withdrawal,
    Charge,
    Interest,
    TransferIn,
    TransferOut,
    /// Anything the bank feed could not classify
    Unclassified {
        inflow: bool,
    },
}

impl BankTransactionKind {
    /// Whether money flows into the bank account
    pub fn is_inflow(&self) -> bool {
        match self {
            BankTransactionKind::Deposit
            | BankTransactionKind::Interest
            | BankTransactionKind::TransferIn => true,
            BankTransactionKind::Withdrawal
            | BankTransactionKind::Charge
            | BankTransactionKind::TransferOut => false,
            BankTransactionKind::Unclassified { inflow } => *inflow,
        }
    }
}

/// A single bank-ledger transaction to shadow into the journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTransactionPosting {
    pub bank_name: String,
    /// GL account the bank account is linked to, if any
    pub gl_code: Option<String>,
    pub kind: BankTransactionKind,
    pub amount: BigDecimal,
    pub description: String,
    pub reference: String,
    pub entry_date: NaiveDate,
}

/// A transfer between two bank accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTransferPosting {
    pub from_name: String,
    pub from_gl_code: Option<String>,
    pub to_name: String,
    pub to_gl_code: Option<String>,
    pub amount: BigDecimal,
    pub reference: String,
    pub entry_date: NaiveDate,
}

/// Shadow-posts bank-ledger activity into the journal
pub struct BankPostingEngine<S: FinanceStore + Clone> {
    chart: ChartManager<S>,
    resolver: MappingResolver<S>,
    journal: JournalManager<S>,
}

impl<S: FinanceStore + Clone> BankPostingEngine<S> {
    pub fn new(storage: S) -> Self {
        Self {
            chart: ChartManager::new(storage.clone()),
            resolver: MappingResolver::new(storage.clone()),
            journal: JournalManager::new(storage),
        }
    }

    async fn existing_entry(
        &self,
        reference_type: ReferenceType,
        reference_id: &str,
    ) -> FinanceResult<Option<JournalEntry>> {
        let mut entries = self
            .journal
            .find_by_reference(reference_type, reference_id)
            .await?;
        if entries.is_empty() {
            Ok(None)
        } else {
            debug!(reference_id, "entry already exists for reference; skipping repost");
            Ok(Some(entries.remove(0)))
        }
    }

    /// The GL bank account for a posting, or `None` (with a warning) when
    /// the link is missing or dangling
    async fn linked_account(
        &self,
        bank_name: &str,
        gl_code: &Option<String>,
    ) -> FinanceResult<Option<Account>> {
        let code = match gl_code {
            Some(code) => code,
            None => {
                warn!(bank_name, "bank account has no GL link; transaction not posted");
                return Ok(None);
            }
        };
        match self.chart.get_by_code(code).await? {
            Some(account) if account.is_active => Ok(Some(account)),
            _ => {
                warn!(
                    bank_name,
                    code = %code,
                    "GL link points at a missing or inactive account; transaction not posted"
                );
                Ok(None)
            }
        }
    }

    /// Contra account for a transaction kind. Unresolvable contras land on
    /// Suspense & Clearing so the entry can still post.
    async fn contra_account(&self, kind: BankTransactionKind) -> FinanceResult<Account> {
        let resolved = match kind {
            BankTransactionKind::Deposit => {
                self.resolver
                    .resolve(MappingType::Revenue, "bank_deposit")
                    .await?
            }
            BankTransactionKind::Withdrawal => {
                self.resolver
                    .resolve(MappingType::Expense, "bank_withdrawal")
                    .await?
            }
            BankTransactionKind::Charge => {
                self.resolver
                    .resolve(MappingType::Expense, "bank_charge")
                    .await?
            }
            BankTransactionKind::Interest => {
                self.resolver
                    .resolve(MappingType::Revenue, "bank_interest")
                    .await?
            }
            BankTransactionKind::TransferIn
            | BankTransactionKind::TransferOut
            | BankTransactionKind::Unclassified { .. } => codes::SUSPENSE.to_string(),
        };

        match self.chart.get_by_code(&resolved).await? {
            Some(account) if account.is_active => Ok(account),
            _ => {
                warn!(code = %resolved, "contra account unresolvable; using suspense");
                self.chart.get_required(codes::SUSPENSE).await
            }
        }
    }

    /// Shadow one bank transaction into the journal. Returns `None` when
    /// the bank account has no usable GL link.
    pub async fn post_bank_transaction(
        &mut self,
        txn: &BankTransactionPosting,
    ) -> FinanceResult<Option<JournalEntry>> {
        if let Some(entry) = self
            .existing_entry(ReferenceType::BankTransaction, &txn.reference)
            .await?
        {
            return Ok(Some(entry));
        }
        validate_positive_amount(&txn.amount)?;

        let bank = match self.linked_account(&txn.bank_name, &txn.gl_code).await? {
            Some(account) => account,
            None => return Ok(None),
        };
        let contra = self.contra_account(txn.kind).await?;

        let builder = EntryBuilder::new(
            txn.entry_date,
            format!("{} - {}", txn.bank_name, txn.description),
        )
        .reference(ReferenceType::BankTransaction, txn.reference.clone());

        let entry = if txn.kind.is_inflow() {
            builder
                .debit(bank.code, bank.name, txn.amount.clone(), None)
                .credit(contra.code, contra.name, txn.amount.clone(), None)
                .build()?
        } else {
            builder
                .debit(contra.code, contra.name, txn.amount.clone(), None)
                .credit(bank.code, bank.name, txn.amount.clone(), None)
                .build()?
        };

        self.journal.create_and_post(entry).await.map(Some)
    }

    /// Shadow a transfer between two bank accounts as one two-line entry.
    /// If either side lacks a GL link nothing is posted.
    pub async fn post_bank_transfer(
        &mut self,
        transfer: &BankTransferPosting,
    ) -> FinanceResult<Option<JournalEntry>> {
        if let Some(entry) = self
            .existing_entry(ReferenceType::Transfer, &transfer.reference)
            .await?
        {
            return Ok(Some(entry));
        }
        validate_positive_amount(&transfer.amount)?;

        let from = self
            .linked_account(&transfer.from_name, &transfer.from_gl_code)
            .await?;
        let to = self
            .linked_account(&transfer.to_name, &transfer.to_gl_code)
            .await?;

        let (from, to) = match (from, to) {
            (Some(from), Some(to)) => (from, to),
            _ => return Ok(None),
        };

        if from.code == to.code {
            // Both bank accounts settle into the same GL account; a
            // two-line entry would debit and credit the same code.
            debug!(code = %from.code, "transfer within one GL account; nothing to post");
            return Ok(None);
        }

        let entry = EntryBuilder::new(
            transfer.entry_date,
            format!("Transfer {} -> {}", transfer.from_name, transfer.to_name),
        )
        .reference(ReferenceType::Transfer, transfer.reference.clone())
        .debit(to.code, to.name, transfer.amount.clone(), None)
        .credit(from.code, from.name, transfer.amount.clone(), None)
        .build()?;

        self.journal.create_and_post(entry).await.map(Some)
    }
}
