//! Traits for storage abstraction and extensibility
//!
//! The external document store is an opaque collaborator; these traits are
//! the seams the finance core talks through. Any backend (Postgres, a
//! document database, in-memory for tests) can plug in by implementing
//! them. Updates on versioned documents must check the caller's `version`
//! token and bump it, surfacing [`FinanceError::VersionConflict`] on
//! mismatch.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::mapping::{AccountMapping, MappingType};
use crate::reconciliation::UnpostedTransaction;
use crate::services::assets::Asset;
use crate::services::banking::{BankAccount, BankTransaction};
use crate::services::expenses::Expense;
use crate::services::payments::Payment;
use crate::services::payroll::SalaryRecord;
use crate::types::*;

/// Filter for journal-entry queries
#[derive(Debug, Clone, Default)]
pub struct EntryQuery {
    /// Earliest entry date, inclusive
    pub start_date: Option<NaiveDate>,
    /// Latest entry date, inclusive
    pub end_date: Option<NaiveDate>,
    /// Restrict to a lifecycle status
    pub status: Option<EntryStatus>,
    /// Restrict to a source event family
    pub reference_type: Option<ReferenceType>,
    /// Restrict to a specific source reference
    pub reference_id: Option<String>,
}

impl EntryQuery {
    /// Query for posted entries up to (and including) a cut-off date
    pub fn posted_as_of(as_of: Option<NaiveDate>) -> Self {
        Self {
            end_date: as_of,
            status: Some(EntryStatus::Posted),
            ..Self::default()
        }
    }

    /// Query for posted entries within a date range
    pub fn posted_between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: Some(start),
            end_date: Some(end),
            status: Some(EntryStatus::Posted),
            ..Self::default()
        }
    }

    /// Query by source reference
    pub fn by_reference(reference_type: ReferenceType, reference_id: &str) -> Self {
        Self {
            reference_type: Some(reference_type),
            reference_id: Some(reference_id.to_string()),
            ..Self::default()
        }
    }
}

/// Storage for the chart of accounts
#[async_trait]
pub trait ChartStore: Send + Sync {
    /// Save a new account, keyed by code
    async fn save_account(&mut self, account: &Account) -> FinanceResult<()>;

    /// Get an account by code
    async fn get_account(&self, code: &str) -> FinanceResult<Option<Account>>;

    /// List all accounts, optionally filtered by type
    async fn list_accounts(&self, account_type: Option<AccountType>) -> FinanceResult<Vec<Account>>;

    /// Update an existing account
    async fn update_account(&mut self, account: &Account) -> FinanceResult<()>;
}

/// Storage for account mappings
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Save a new mapping
    async fn save_mapping(&mut self, mapping: &AccountMapping) -> FinanceResult<()>;

    /// Get a mapping by id
    async fn get_mapping(&self, id: &str) -> FinanceResult<Option<AccountMapping>>;

    /// List all mappings, optionally filtered by mapping type
    async fn list_mappings(
        &self,
        mapping_type: Option<MappingType>,
    ) -> FinanceResult<Vec<AccountMapping>>;

    /// Version-checked update; returns the stored document with its bumped
    /// version token
    async fn update_mapping(&mut self, mapping: &AccountMapping) -> FinanceResult<AccountMapping>;
}

/// Storage for journal entries
#[async_trait]
pub trait JournalStore: Send + Sync {
    /// Save a new journal entry
    async fn save_entry(&mut self, entry: &JournalEntry) -> FinanceResult<()>;

    /// Get a journal entry by id
    async fn get_entry(&self, id: &str) -> FinanceResult<Option<JournalEntry>>;

    /// Find journal entries matching a query
    async fn find_entries(&self, query: &EntryQuery) -> FinanceResult<Vec<JournalEntry>>;

    /// Version-checked update; returns the stored document with its bumped
    /// version token
    async fn update_entry(&mut self, entry: &JournalEntry) -> FinanceResult<JournalEntry>;
}

/// Storage for the domain-service records (payments, expenses, salaries,
/// assets, banking) and the unposted-transaction markers
#[async_trait]
pub trait RegistryStore: Send + Sync {
    // Payments
    async fn save_payment(&mut self, payment: &Payment) -> FinanceResult<()>;
    async fn list_payments(&self) -> FinanceResult<Vec<Payment>>;

    // Expenses
    async fn save_expense(&mut self, expense: &Expense) -> FinanceResult<()>;
    async fn get_expense(&self, id: &str) -> FinanceResult<Option<Expense>>;
    async fn update_expense(&mut self, expense: &Expense) -> FinanceResult<Expense>;
    async fn list_expenses(&self) -> FinanceResult<Vec<Expense>>;

    /// Create a salary record keyed by its natural `{staff_id}:{period}`
    /// key. Fails with [`FinanceError::DuplicateRecord`] if one already
    /// exists for that key - uniqueness is enforced by construction rather
    /// than by a read-then-write scan.
    async fn create_salary_record(&mut self, record: &SalaryRecord) -> FinanceResult<()>;
    async fn list_salary_records(&self, period: Option<&str>) -> FinanceResult<Vec<SalaryRecord>>;

    // Assets
    async fn save_asset(&mut self, asset: &Asset) -> FinanceResult<()>;
    async fn get_asset(&self, id: &str) -> FinanceResult<Option<Asset>>;
    async fn update_asset(&mut self, asset: &Asset) -> FinanceResult<Asset>;
    async fn list_assets(&self) -> FinanceResult<Vec<Asset>>;

    // Banking
    async fn save_bank_account(&mut self, account: &BankAccount) -> FinanceResult<()>;
    async fn get_bank_account(&self, id: &str) -> FinanceResult<Option<BankAccount>>;
    async fn update_bank_account(&mut self, account: &BankAccount) -> FinanceResult<BankAccount>;
    async fn list_bank_accounts(&self) -> FinanceResult<Vec<BankAccount>>;
    async fn save_bank_transaction(&mut self, txn: &BankTransaction) -> FinanceResult<()>;
    async fn list_bank_transactions(
        &self,
        bank_account_id: Option<&str>,
    ) -> FinanceResult<Vec<BankTransaction>>;

    // Unposted-transaction markers (shadow postings that failed)
    async fn save_unposted(&mut self, marker: &UnpostedTransaction) -> FinanceResult<()>;
    async fn list_unposted(&self) -> FinanceResult<Vec<UnpostedTransaction>>;
    async fn update_unposted(&mut self, marker: &UnpostedTransaction) -> FinanceResult<()>;
    async fn delete_unposted(&mut self, id: &str) -> FinanceResult<()>;
}

/// Everything the finance core needs from a storage backend
pub trait FinanceStore: ChartStore + MappingStore + JournalStore + RegistryStore {}

impl<T: ChartStore + MappingStore + JournalStore + RegistryStore> FinanceStore for T {}

/// Trait for pluggable journal-entry validation rules
pub trait EntryValidator: Send + Sync {
    /// Validate an entry before it is saved or posted
    fn validate_entry(&self, entry: &JournalEntry) -> FinanceResult<()>;
}

/// Default validator: the double-entry rules on [`JournalEntry::validate`]
pub struct DefaultEntryValidator;

impl EntryValidator for DefaultEntryValidator {
    fn validate_entry(&self, entry: &JournalEntry) -> FinanceResult<()> {
        entry.validate()
    }
}
