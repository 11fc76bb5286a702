//! In-memory storage implementation for testing and development
//!
//! Implements every storage trait over shared hash maps. Versioned
//! documents get optimistic-concurrency checks: an update whose version
//! token does not match the stored document fails with a version
//! conflict, and successful updates bump the token.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::mapping::{AccountMapping, MappingType};
use crate::reconciliation::UnpostedTransaction;
use crate::services::assets::Asset;
use crate::services::banking::{BankAccount, BankTransaction};
use crate::services::expenses::Expense;
use crate::services::payments::Payment;
use crate::services::payroll::SalaryRecord;
use crate::traits::*;
use crate::types::*;

/// In-memory document store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    mappings: Arc<RwLock<HashMap<String, AccountMapping>>>,
    entries: Arc<RwLock<HashMap<String, JournalEntry>>>,
    payments: Arc<RwLock<HashMap<String, Payment>>>,
    expenses: Arc<RwLock<HashMap<String, Expense>>>,
    salaries: Arc<RwLock<HashMap<String, SalaryRecord>>>,
    assets: Arc<RwLock<HashMap<String, Asset>>>,
    bank_accounts: Arc<RwLock<HashMap<String, BankAccount>>>,
    bank_transactions: Arc<RwLock<HashMap<String, BankTransaction>>>,
    unposted: Arc<RwLock<HashMap<String, UnpostedTransaction>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all collections (useful between tests)
    pub fn clear(&self) {
        self.accounts.write().unwrap().clear();
        self.mappings.write().unwrap().clear();
        self.entries.write().unwrap().clear();
        self.payments.write().unwrap().clear();
        self.expenses.write().unwrap().clear();
        self.salaries.write().unwrap().clear();
        self.assets.write().unwrap().clear();
        self.bank_accounts.write().unwrap().clear();
        self.bank_transactions.write().unwrap().clear();
        self.unposted.write().unwrap().clear();
    }
}

#[async_trait]
impl ChartStore for MemoryStore {
    async fn save_account(&mut self, account: &Account) -> FinanceResult<()> {
        self.accounts
            .write()
            .unwrap()
            .insert(account.code.clone(), account.clone());
        Ok(())
    }

    async fn get_account(&self, code: &str) -> FinanceResult<Option<Account>> {
        Ok(self.accounts.read().unwrap().get(code).cloned())
    }

    async fn list_accounts(&self, account_type: Option<AccountType>) -> FinanceResult<Vec<Account>> {
        let accounts = self.accounts.read().unwrap();
        let mut filtered: Vec<Account> = accounts
            .values()
            .filter(|account| {
                account_type.is_none_or(|wanted| account.account_type == wanted)
            })
            .cloned()
            .collect();
        filtered.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(filtered)
    }

    async fn update_account(&mut self, account: &Account) -> FinanceResult<()> {
        let mut accounts = self.accounts.write().unwrap();
        if !accounts.contains_key(&account.code) {
            return Err(FinanceError::AccountNotFound(account.code.clone()));
        }
        accounts.insert(account.code.clone(), account.clone());
        Ok(())
    }
}

#[async_trait]
impl MappingStore for MemoryStore {
    async fn save_mapping(&mut self, mapping: &AccountMapping) -> FinanceResult<()> {
        self.mappings
            .write()
            .unwrap()
            .insert(mapping.id.clone(), mapping.clone());
        Ok(())
    }

    async fn get_mapping(&self, id: &str) -> FinanceResult<Option<AccountMapping>> {
        Ok(self.mappings.read().unwrap().get(id).cloned())
    }

    async fn list_mappings(
        &self,
        mapping_type: Option<MappingType>,
    ) -> FinanceResult<Vec<AccountMapping>> {
        let mappings = self.mappings.read().unwrap();
        Ok(mappings
            .values()
            .filter(|mapping| mapping_type.is_none_or(|wanted| mapping.mapping_type == wanted))
            .cloned()
            .collect())
    }

    async fn update_mapping(&mut self, mapping: &AccountMapping) -> FinanceResult<AccountMapping> {
        let mut mappings = self.mappings.write().unwrap();
        let stored = mappings
            .get(&mapping.id)
            .ok_or_else(|| FinanceError::RecordNotFound(format!("mapping {}", mapping.id)))?;
        if stored.version != mapping.version {
            return Err(FinanceError::VersionConflict(format!(
                "mapping {}",
                mapping.id
            )));
        }
        let mut updated = mapping.clone();
        updated.version += 1;
        mappings.insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }
}

#[async_trait]
impl JournalStore for MemoryStore {
    async fn save_entry(&mut self, entry: &JournalEntry) -> FinanceResult<()> {
        self.entries
            .write()
            .unwrap()
            .insert(entry.id.clone(), entry.clone());
        Ok(())
    }

    async fn get_entry(&self, id: &str) -> FinanceResult<Option<JournalEntry>> {
        Ok(self.entries.read().unwrap().get(id).cloned())
    }

    async fn find_entries(&self, query: &EntryQuery) -> FinanceResult<Vec<JournalEntry>> {
        let entries = self.entries.read().unwrap();
        let mut matched: Vec<JournalEntry> = entries
            .values()
            .filter(|entry| {
                if let Some(start) = query.start_date {
                    if entry.entry_date < start {
                        return false;
                    }
                }
                if let Some(end) = query.end_date {
                    if entry.entry_date > end {
                        return false;
                    }
                }
                if let Some(status) = query.status {
                    if entry.status != status {
                        return false;
                    }
                }
                if let Some(reference_type) = query.reference_type {
                    if entry.reference_type != reference_type {
                        return false;
                    }
                }
                if let Some(ref reference_id) = query.reference_id {
                    if &entry.reference_id != reference_id {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            a.entry_date
                .cmp(&b.entry_date)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(matched)
    }

    async fn update_entry(&mut self, entry: &JournalEntry) -> FinanceResult<JournalEntry> {
        let mut entries = self.entries.write().unwrap();
        let stored = entries
            .get(&entry.id)
            .ok_or_else(|| FinanceError::EntryNotFound(entry.id.clone()))?;
        if stored.version != entry.version {
            return Err(FinanceError::VersionConflict(format!("entry {}", entry.id)));
        }
        let mut updated = entry.clone();
        updated.version += 1;
        entries.insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }
}

#[async_trait]
impl RegistryStore for MemoryStore {
    async fn save_payment(&mut self, payment: &Payment) -> FinanceResult<()> {
        self.payments
            .write()
            .unwrap()
            .insert(payment.id.clone(), payment.clone());
        Ok(())
    }

    async fn list_payments(&self) -> FinanceResult<Vec<Payment>> {
        let mut payments: Vec<Payment> = self.payments.read().unwrap().values().cloned().collect();
        payments.sort_by(|a, b| a.payment_date.cmp(&b.payment_date));
        Ok(payments)
    }

    async fn save_expense(&mut self, expense: &Expense) -> FinanceResult<()> {
        self.expenses
            .write()
            .unwrap()
            .insert(expense.id.clone(), expense.clone());
        Ok(())
    }

    async fn get_expense(&self, id: &str) -> FinanceResult<Option<Expense>> {
        Ok(self.expenses.read().unwrap().get(id).cloned())
    }

    async fn update_expense(&mut self, expense: &Expense) -> FinanceResult<Expense> {
        let mut expenses = self.expenses.write().unwrap();
        let stored = expenses
            .get(&expense.id)
            .ok_or_else(|| FinanceError::RecordNotFound(format!("expense {}", expense.id)))?;
        if stored.version != expense.version {
            return Err(FinanceError::VersionConflict(format!(
                "expense {}",
                expense.id
            )));
        }
        let mut updated = expense.clone();
        updated.version += 1;
        expenses.insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }

    async fn list_expenses(&self) -> FinanceResult<Vec<Expense>> {
        let mut expenses: Vec<Expense> = self.expenses.read().unwrap().values().cloned().collect();
        expenses.sort_by(|a, b| a.incurred_on.cmp(&b.incurred_on));
        Ok(expenses)
    }

    async fn create_salary_record(&mut self, record: &SalaryRecord) -> FinanceResult<()> {
        let mut salaries = self.salaries.write().unwrap();
        let key = record.natural_key();
        if salaries.contains_key(&key) {
            return Err(FinanceError::DuplicateRecord(format!(
                "salary for staff '{}' in period {}",
                record.staff_id, record.period
            )));
        }
        salaries.insert(key, record.clone());
        Ok(())
    }

    async fn list_salary_records(&self, period: Option<&str>) -> FinanceResult<Vec<SalaryRecord>> {
        let salaries = self.salaries.read().unwrap();
        let mut records: Vec<SalaryRecord> = salaries
            .values()
            .filter(|record| period.is_none_or(|wanted| record.period == wanted))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.period.cmp(&b.period).then(a.staff_id.cmp(&b.staff_id)));
        Ok(records)
    }

    async fn save_asset(&mut self, asset: &Asset) -> FinanceResult<()> {
        self.assets
            .write()
            .unwrap()
            .insert(asset.id.clone(), asset.clone());
        Ok(())
    }

    async fn get_asset(&self, id: &str) -> FinanceResult<Option<Asset>> {
        Ok(self.assets.read().unwrap().get(id).cloned())
    }

    async fn update_asset(&mut self, asset: &Asset) -> FinanceResult<Asset> {
        let mut assets = self.assets.write().unwrap();
        let stored = assets
            .get(&asset.id)
            .ok_or_else(|| FinanceError::RecordNotFound(format!("asset {}", asset.id)))?;
        if stored.version != asset.version {
            return Err(FinanceError::VersionConflict(format!("asset {}", asset.id)));
        }
        let mut updated = asset.clone();
        updated.version += 1;
        assets.insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }

    async fn list_assets(&self) -> FinanceResult<Vec<Asset>> {
        let mut assets: Vec<Asset> = self.assets.read().unwrap().values().cloned().collect();
        assets.sort_by(|a, b| a.purchase_date.cmp(&b.purchase_date));
        Ok(assets)
    }

    async fn save_bank_account(&mut self, account: &BankAccount) -> FinanceResult<()> {
        self.bank_accounts
            .write()
            .unwrap()
            .insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn get_bank_account(&self, id: &str) -> FinanceResult<Option<BankAccount>> {
        Ok(self.bank_accounts.read().unwrap().get(id).cloned())
    }

    async fn update_bank_account(&mut self, account: &BankAccount) -> FinanceResult<BankAccount> {
        let mut accounts = self.bank_accounts.write().unwrap();
        let stored = accounts
            .get(&account.id)
            .ok_or_else(|| FinanceError::RecordNotFound(format!("bank account {}", account.id)))?;
        if stored.version != account.version {
            return Err(FinanceError::VersionConflict(format!(
                "bank account {}",
                account.id
            )));
        }
        let mut updated = account.clone();
        updated.version += 1;
        accounts.insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }

    async fn list_bank_accounts(&self) -> FinanceResult<Vec<BankAccount>> {
        let mut accounts: Vec<BankAccount> = self
            .bank_accounts
            .read()
            .unwrap()
            .values()
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(accounts)
    }

    async fn save_bank_transaction(&mut self, txn: &BankTransaction) -> FinanceResult<()> {
        self.bank_transactions
            .write()
            .unwrap()
            .insert(txn.id.clone(), txn.clone());
        Ok(())
    }

    async fn list_bank_transactions(
        &self,
        bank_account_id: Option<&str>,
    ) -> FinanceResult<Vec<BankTransaction>> {
        let transactions = self.bank_transactions.read().unwrap();
        let mut matched: Vec<BankTransaction> = transactions
            .values()
            .filter(|txn| bank_account_id.is_none_or(|wanted| txn.bank_account_id == wanted))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            a.transaction_date
                .cmp(&b.transaction_date)
                .then(a.recorded_at.cmp(&b.recorded_at))
        });
        Ok(matched)
    }

    async fn save_unposted(&mut self, marker: &UnpostedTransaction) -> FinanceResult<()> {
        self.unposted
            .write()
            .unwrap()
            .insert(marker.id.clone(), marker.clone());
        Ok(())
    }

    async fn list_unposted(&self) -> FinanceResult<Vec<UnpostedTransaction>> {
        let mut markers: Vec<UnpostedTransaction> =
            self.unposted.read().unwrap().values().cloned().collect();
        markers.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at));
        Ok(markers)
    }

    async fn update_unposted(&mut self, marker: &UnpostedTransaction) -> FinanceResult<()> {
        let mut markers = self.unposted.write().unwrap();
        if !markers.contains_key(&marker.id) {
            return Err(FinanceError::RecordNotFound(format!(
                "unposted marker {}",
                marker.id
            )));
        }
        markers.insert(marker.id.clone(), marker.clone());
        Ok(())
    }

    async fn delete_unposted(&mut self, id: &str) -> FinanceResult<()> {
        if self.unposted.write().unwrap().remove(id).is_none() {
            return Err(FinanceError::RecordNotFound(format!(
                "unposted marker {}",
                id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn sample_entry(version: u64) -> JournalEntry {
        let now = chrono::Utc::now().naive_utc();
        JournalEntry {
            id: "je-ver".to_string(),
            entry_number: "JE-2026-MEMS01".to_string(),
            entry_date: NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
            description: "versioned".to_string(),
            lines: vec![
                JournalLine::debit("1110", "Cash on Hand", BigDecimal::from(10), None),
                JournalLine::credit("4110", "Tuition Fees", BigDecimal::from(10), None),
            ],
            reference_type: ReferenceType::Manual,
            reference_id: "MAN-3".to_string(),
            status: EntryStatus::Draft,
            created_by: "system".to_string(),
            posted_at: None,
            created_at: now,
            updated_at: now,
            version,
        }
    }

    #[tokio::test]
    async fn stale_version_update_is_rejected() {
        let mut store = MemoryStore::new();
        store.save_entry(&sample_entry(0)).await.unwrap();

        // first update succeeds and bumps the token
        let updated = store.update_entry(&sample_entry(0)).await.unwrap();
        assert_eq!(updated.version, 1);

        // replaying the stale version conflicts
        let stale = store.update_entry(&sample_entry(0)).await;
        assert!(matches!(stale, Err(FinanceError::VersionConflict(_))));

        // the fresh version goes through
        let fresh = store.update_entry(&sample_entry(1)).await.unwrap();
        assert_eq!(fresh.version, 2);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let mut store = MemoryStore::new();
        let reader = store.clone();

        store.save_entry(&sample_entry(0)).await.unwrap();
        assert!(reader.get_entry("je-ver").await.unwrap().is_some());
    }
}
