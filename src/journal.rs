//! Journal entry lifecycle and trial balance
//!
//! Entries are created as drafts, validated for balance, and posted.
//! Posted entries are immutable; corrections are made by reversing
//! entries, never by editing in place.

use std::collections::BTreeMap;

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::traits::{
    ChartStore, DefaultEntryValidator, EntryQuery, EntryValidator, JournalStore,
};
use crate::types::*;
use crate::utils::references;
use crate::utils::validation::validate_description;

/// Builder for journal entries
#[derive(Debug)]
pub struct EntryBuilder {
    entry_date: NaiveDate,
    description: String,
    lines: Vec<JournalLine>,
    reference_type: ReferenceType,
    reference_id: String,
    created_by: String,
}

impl EntryBuilder {
    pub fn new(entry_date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            entry_date,
            description: description.into(),
            lines: Vec::new(),
            reference_type: ReferenceType::Manual,
            reference_id: String::new(),
            created_by: "system".to_string(),
        }
    }

    /// Tie the entry to its source business transaction
    pub fn reference(mut self, reference_type: ReferenceType, reference_id: impl Into<String>) -> Self {
        self.reference_type = reference_type;
        self.reference_id = reference_id.into();
        self
    }

    pub fn created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = created_by.into();
        self
    }

    /// Add a debit line
    pub fn debit(
        mut self,
        account_code: impl Into<String>,
        account_name: impl Into<String>,
        amount: BigDecimal,
        description: Option<String>,
    ) -> Self {
        self.lines
            .push(JournalLine::debit(account_code, account_name, amount, description));
        self
    }

    /// Add a credit line
    pub fn credit(
        mut self,
        account_code: impl Into<String>,
        account_name: impl Into<String>,
        amount: BigDecimal,
        description: Option<String>,
    ) -> Self {
        self.lines
            .push(JournalLine::credit(account_code, account_name, amount, description));
        self
    }

    /// Add a prepared line
    pub fn line(mut self, line: JournalLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Build a draft entry; fails if the lines do not balance
    pub fn build(self) -> FinanceResult<JournalEntry> {
        validate_description(&self.description)?;
        let now = chrono::Utc::now().naive_utc();
        let entry = JournalEntry {
            id: Uuid::new_v4().to_string(),
            entry_number: references::entry_number(self.entry_date.year()),
            entry_date: self.entry_date,
            description: self.description,
            lines: self.lines,
            reference_type: self.reference_type,
            reference_id: self.reference_id,
            status: EntryStatus::Draft,
            created_by: self.created_by,
            posted_at: None,
            created_at: now,
            updated_at: now,
            version: 0,
        };
        entry.validate()?;
        Ok(entry)
    }
}

/// Manager for journal entry operations
pub struct JournalManager<S: JournalStore + ChartStore> {
    storage: S,
    validator: Box<dyn EntryValidator>,
}

impl<S: JournalStore + ChartStore> JournalManager<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultEntryValidator),
        }
    }

    pub fn with_validator(storage: S, validator: Box<dyn EntryValidator>) -> Self {
        Self { storage, validator }
    }

    /// Persist a draft entry after validating balance and account
    /// references
    pub async fn create_entry(&mut self, entry: JournalEntry) -> FinanceResult<JournalEntry> {
        self.validator.validate_entry(&entry)?;

        for line in &entry.lines {
            if self.storage.get_account(&line.account_code).await?.is_none() {
                return Err(FinanceError::AccountNotFound(line.account_code.clone()));
            }
        }

        self.storage.save_entry(&entry).await?;
        Ok(entry)
    }

    /// Transition a draft entry to posted. Re-validates balance; fails if
    /// the entry is already posted.
    pub async fn post_entry(&mut self, id: &str) -> FinanceResult<JournalEntry> {
        let mut entry = self.get_required(id).await?;

        if entry.status == EntryStatus::Posted {
            return Err(FinanceError::AlreadyPosted(entry.entry_number));
        }

        self.validator.validate_entry(&entry)?;

        let now = chrono::Utc::now().naive_utc();
        entry.status = EntryStatus::Posted;
        entry.posted_at = Some(now);
        entry.updated_at = now;
        self.storage.update_entry(&entry).await
    }

    /// Create a draft and post it in one step
    pub async fn create_and_post(&mut self, entry: JournalEntry) -> FinanceResult<JournalEntry> {
        let created = self.create_entry(entry).await?;
        self.post_entry(&created.id).await
    }

    /// Create and post an offsetting entry that reverses a posted entry.
    /// The original is left untouched.
    pub async fn reverse_entry(
        &mut self,
        id: &str,
        entry_date: NaiveDate,
        reason: &str,
    ) -> FinanceResult<JournalEntry> {
        let original = self.get_required(id).await?;
        if original.status != EntryStatus::Posted {
            return Err(FinanceError::Validation(format!(
                "Only posted entries can be reversed; '{}' is a draft",
                original.entry_number
            )));
        }

        let mut builder = EntryBuilder::new(
            entry_date,
            format!("Reversal of {}: {}", original.entry_number, reason),
        )
        .reference(
            original.reference_type,
            format!("{}-REV", original.reference_id),
        )
        .created_by(original.created_by.clone());

        for line in &original.lines {
            let zero = BigDecimal::from(0);
            if line.debit > zero {
                builder = builder.credit(
                    line.account_code.clone(),
                    line.account_name.clone(),
                    line.debit.clone(),
                    line.description.clone(),
                );
            } else {
                builder = builder.debit(
                    line.account_code.clone(),
                    line.account_name.clone(),
                    line.credit.clone(),
                    line.description.clone(),
                );
            }
        }

        let reversal = builder.build()?;
        self.create_and_post(reversal).await
    }

    pub async fn get_entry(&self, id: &str) -> FinanceResult<Option<JournalEntry>> {
        self.storage.get_entry(id).await
    }

    pub async fn get_required(&self, id: &str) -> FinanceResult<JournalEntry> {
        self.storage
            .get_entry(id)
            .await?
            .ok_or_else(|| FinanceError::EntryNotFound(id.to_string()))
    }

    /// Find entries matching a query
    pub async fn find_entries(&self, query: &EntryQuery) -> FinanceResult<Vec<JournalEntry>> {
        self.storage.find_entries(query).await
    }

    /// All entries derived from one source transaction
    pub async fn find_by_reference(
        &self,
        reference_type: ReferenceType,
        reference_id: &str,
    ) -> FinanceResult<Vec<JournalEntry>> {
        self.storage
            .find_entries(&EntryQuery::by_reference(reference_type, reference_id))
            .await
    }

    /// Aggregate posted lines per account up to a cut-off date
    pub async fn trial_balance(&self, as_of: Option<NaiveDate>) -> FinanceResult<TrialBalance> {
        let entries = self
            .storage
            .find_entries(&EntryQuery::posted_as_of(as_of))
            .await?;

        #[derive(Default)]
        struct Accumulated {
            name: String,
            debit: BigDecimal,
            credit: BigDecimal,
        }

        let mut per_account: BTreeMap<String, Accumulated> = BTreeMap::new();
        for entry in &entries {
            for line in &entry.lines {
                let slot = per_account.entry(line.account_code.clone()).or_default();
                if slot.name.is_empty() {
                    slot.name = line.account_name.clone();
                }
                slot.debit += &line.debit;
                slot.credit += &line.credit;
            }
        }

        let mut rows = Vec::with_capacity(per_account.len());
        let mut total_debits = BigDecimal::from(0);
        let mut total_credits = BigDecimal::from(0);

        for (code, accumulated) in per_account {
            let account_type = match self.storage.get_account(&code).await? {
                Some(account) => account.account_type,
                None => AccountCategory::from_code(&code)
                    .map(|c| c.account_type())
                    .unwrap_or(AccountType::Asset),
            };
            total_debits += &accumulated.debit;
            total_credits += &accumulated.credit;
            rows.push(TrialBalanceRow {
                account_code: code,
                account_name: accumulated.name,
                account_type,
                total_debit: accumulated.debit,
                total_credit: accumulated.credit,
            });
        }

        let is_balanced = (&total_debits - &total_credits).abs() < balance_tolerance();
        Ok(TrialBalance {
            as_of_date: as_of,
            rows,
            total_debits,
            total_credits,
            is_balanced,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{codes, ChartManager};
    use crate::utils::memory_store::MemoryStore;

    async fn seeded_manager() -> JournalManager<MemoryStore> {
        let storage = MemoryStore::new();
        let mut chart = ChartManager::new(storage.clone());
        chart.initialize_defaults().await.unwrap();
        JournalManager::new(storage)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cash_sale(amount: i64, day: u32) -> JournalEntry {
        EntryBuilder::new(date(2026, 1, day), "Cash fee receipt")
            .reference(ReferenceType::Payment, format!("PAY-2026-TEST{:04}", day))
            .debit(codes::CASH, "Cash on Hand", BigDecimal::from(amount), None)
            .credit(codes::TUITION_FEES, "Tuition Fees", BigDecimal::from(amount), None)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn builder_rejects_unbalanced_lines() {
        let result = EntryBuilder::new(date(2026, 1, 5), "Broken")
            .debit(codes::CASH, "Cash on Hand", BigDecimal::from(100), None)
            .credit(codes::TUITION_FEES, "Tuition Fees", BigDecimal::from(90), None)
            .build();
        assert!(matches!(result, Err(FinanceError::UnbalancedEntry { .. })));
    }

    #[tokio::test]
    async fn unknown_account_is_a_referential_error() {
        let mut journal = seeded_manager().await;
        let entry = EntryBuilder::new(date(2026, 1, 5), "Bad account")
            .debit("1170", "No Such Account", BigDecimal::from(100), None)
            .credit(codes::TUITION_FEES, "Tuition Fees", BigDecimal::from(100), None)
            .build()
            .unwrap();
        assert!(matches!(
            journal.create_entry(entry).await,
            Err(FinanceError::AccountNotFound(_))
        ));
    }

    #[tokio::test]
    async fn draft_then_post_preserves_lines_and_rejects_double_post() {
        let mut journal = seeded_manager().await;

        let draft = journal.create_entry(cash_sale(1500, 10)).await.unwrap();
        assert_eq!(draft.status, EntryStatus::Draft);
        assert!(draft.posted_at.is_none());

        let posted = journal.post_entry(&draft.id).await.unwrap();
        assert_eq!(posted.status, EntryStatus::Posted);
        assert!(posted.posted_at.is_some());
        assert_eq!(posted.lines, draft.lines);

        let second = journal.post_entry(&draft.id).await;
        assert!(matches!(second, Err(FinanceError::AlreadyPosted(_))));
    }

    #[tokio::test]
    async fn drafts_do_not_enter_the_trial_balance() {
        let mut journal = seeded_manager().await;
        journal.create_entry(cash_sale(900, 8)).await.unwrap();

        let tb = journal.trial_balance(None).await.unwrap();
        assert!(tb.rows.is_empty());
        assert_eq!(tb.total_debits, BigDecimal::from(0));
    }

    #[tokio::test]
    async fn trial_balance_is_idempotent_and_moves_equally() {
        let mut journal = seeded_manager().await;

        let first = journal.create_and_post(cash_sale(2000, 3)).await.unwrap();
        assert_eq!(first.status, EntryStatus::Posted);

        let before = journal.trial_balance(None).await.unwrap();
        let again = journal.trial_balance(None).await.unwrap();
        assert_eq!(before, again);
        assert!(before.is_balanced);

        journal.create_and_post(cash_sale(500, 4)).await.unwrap();
        let after = journal.trial_balance(None).await.unwrap();
        assert_eq!(
            &after.total_debits - &before.total_debits,
            BigDecimal::from(500)
        );
        assert_eq!(
            &after.total_credits - &before.total_credits,
            BigDecimal::from(500)
        );
        assert!(after.is_balanced);
    }

    #[tokio::test]
    async fn trial_balance_respects_cutoff_date() {
        let mut journal = seeded_manager().await;
        journal.create_and_post(cash_sale(1000, 5)).await.unwrap();
        journal.create_and_post(cash_sale(3000, 25)).await.unwrap();

        let mid_month = journal
            .trial_balance(Some(date(2026, 1, 15)))
            .await
            .unwrap();
        assert_eq!(mid_month.total_debits, BigDecimal::from(1000));
    }

    #[tokio::test]
    async fn reversal_offsets_a_posted_entry() {
        let mut journal = seeded_manager().await;
        let posted = journal.create_and_post(cash_sale(1200, 7)).await.unwrap();

        let reversal = journal
            .reverse_entry(&posted.id, date(2026, 1, 9), "posted in error")
            .await
            .unwrap();
        assert_eq!(reversal.status, EntryStatus::Posted);
        assert_eq!(reversal.lines[0].credit, BigDecimal::from(1200));

        let tb = journal.trial_balance(None).await.unwrap();
        assert!(tb.is_balanced);
        let cash_row = tb
            .rows
            .iter()
            .find(|r| r.account_code == codes::CASH)
            .unwrap();
        assert_eq!(cash_row.net_balance(), BigDecimal::from(0));
    }
}
